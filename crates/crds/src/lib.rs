//! MyApp Operator CRD Definitions
//!
//! Kubernetes Custom Resource Definitions for the MyApp operator.

pub mod my_app_resource;

pub use my_app_resource::*;
