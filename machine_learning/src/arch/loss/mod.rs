mod categorical_crossentropy;
mod loss_fn;
mod mse;

pub use categorical_crossentropy::CategoricalCrossentropy;
pub use loss_fn::LossFn;
pub use mse::Mse;
