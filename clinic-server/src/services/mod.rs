pub mod documents;
pub mod pacientes;
