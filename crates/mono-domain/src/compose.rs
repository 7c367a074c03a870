//! Ordered transform pipeline for build-configuration objects. Callers chain
//! pure `(config, context) -> config` functions; composition is a strict
//! left-to-right fold with no hidden mutation between stages.

pub type ConfigTransform<C, X> = Box<dyn Fn(C, &X) -> C + Send + Sync>;

/// Folds `transforms` into a single transform that applies them in order.
pub fn compose<C: 'static, X: 'static>(
    transforms: Vec<ConfigTransform<C, X>>,
) -> ConfigTransform<C, X> {
    Box::new(move |config, context| {
        transforms
            .iter()
            .fold(config, |config, transform| transform(config, context))
    })
}
