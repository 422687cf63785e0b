//! Random workload generation for `tscop`.

pub mod generator;
