pub mod nested_ops;
pub mod num_traits_impls;
pub mod std_ops;
pub mod variable_ops;
