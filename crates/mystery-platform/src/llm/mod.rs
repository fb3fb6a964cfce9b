pub mod edge_function;

pub use edge_function::EdgeFunctionModel;
