pub mod assembler;
pub mod linker;
pub mod registry;
