//! Prints the AKSNodeClass CustomResourceDefinition as YAML.

use crds::AKSNodeClass;
use kube::CustomResourceExt;

fn main() -> Result<(), serde_yaml::Error> {
    print!("{}", serde_yaml::to_string(&AKSNodeClass::crd())?);
    Ok(())
}
