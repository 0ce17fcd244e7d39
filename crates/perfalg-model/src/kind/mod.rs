mod concurrency;
pub use concurrency::Concurrency;

mod node;
pub use node::NodeKind;
