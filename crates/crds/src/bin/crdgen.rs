//! Prints the MyAppResource CRD manifest as YAML.
//!
//! Usage: `cargo run --bin crdgen > myappresource-crd.yaml`

use crds::MyAppResource;
use kube::CustomResourceExt;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    print!("{}", serde_yaml::to_string(&MyAppResource::crd())?);
    Ok(())
}
