//! Node label keys and values used in image requirements.

pub const LABEL_ARCH: &str = "kubernetes.io/arch";
pub const LABEL_OS: &str = "kubernetes.io/os";
pub const LABEL_INSTANCE_TYPE: &str = "node.kubernetes.io/instance-type";
pub const LABEL_TOPOLOGY_ZONE: &str = "topology.kubernetes.io/zone";
pub const LABEL_TOPOLOGY_REGION: &str = "topology.kubernetes.io/region";
pub const LABEL_CAPACITY_TYPE: &str = "karpenter.sh/capacity-type";
pub const LABEL_NODEPOOL: &str = "karpenter.sh/nodepool";

pub const LABEL_SKU_NAME: &str = "karpenter.azure.com/sku-name";
pub const LABEL_SKU_FAMILY: &str = "karpenter.azure.com/sku-family";
pub const LABEL_SKU_VERSION: &str = "karpenter.azure.com/sku-version";
pub const LABEL_SKU_CPU: &str = "karpenter.azure.com/sku-cpu";
pub const LABEL_SKU_MEMORY: &str = "karpenter.azure.com/sku-memory";
pub const LABEL_SKU_ACCELERATED_NETWORKING: &str = "karpenter.azure.com/sku-networking-accelerated";
pub const LABEL_SKU_GPU_NAME: &str = "karpenter.azure.com/sku-gpu-name";
pub const LABEL_SKU_GPU_COUNT: &str = "karpenter.azure.com/sku-gpu-count";
pub const LABEL_SKU_HYPERV_GENERATION: &str = "karpenter.azure.com/sku-hyperv-generation";

pub const ARCH_AMD64: &str = "amd64";
pub const ARCH_ARM64: &str = "arm64";

pub const HYPERV_GENERATION_V1: &str = "1";
pub const HYPERV_GENERATION_V2: &str = "2";

/// Labels every instance type is expected to carry
pub const WELL_KNOWN_LABELS: &[&str] = &[
    LABEL_ARCH,
    LABEL_OS,
    LABEL_INSTANCE_TYPE,
    LABEL_TOPOLOGY_ZONE,
    LABEL_TOPOLOGY_REGION,
    LABEL_CAPACITY_TYPE,
    LABEL_NODEPOOL,
    LABEL_SKU_NAME,
    LABEL_SKU_FAMILY,
    LABEL_SKU_VERSION,
    LABEL_SKU_CPU,
    LABEL_SKU_MEMORY,
    LABEL_SKU_ACCELERATED_NETWORKING,
    LABEL_SKU_GPU_NAME,
    LABEL_SKU_GPU_COUNT,
    LABEL_SKU_HYPERV_GENERATION,
];

/// Label domains reserved for the platform; users cannot define labels under them
pub const RESTRICTED_LABEL_DOMAINS: &[&str] = &["kubernetes.io", "k8s.io", "karpenter.sh", "karpenter.azure.com"];

pub fn is_well_known(key: &str) -> bool {
    WELL_KNOWN_LABELS.contains(&key)
}

/// True when the key's prefix is a restricted domain or a subdomain of one
pub fn is_restricted(key: &str) -> bool {
    let Some((domain, _)) = key.split_once('/') else {
        return false;
    };
    RESTRICTED_LABEL_DOMAINS
        .iter()
        .any(|restricted| domain == *restricted || domain.ends_with(&format!(".{}", restricted)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restricted_domains() {
        assert!(is_restricted(LABEL_SKU_HYPERV_GENERATION));
        assert!(is_restricted("node.kubernetes.io/exclude-from-external-load-balancers"));
        assert!(is_restricted("karpenter.sh/custom"));
        assert!(!is_restricted("example.com/team"));
        assert!(!is_restricted("team"));
        assert!(!is_restricted("notkubernetes.io/label"));
    }

    #[test]
    fn test_well_known() {
        assert!(is_well_known(LABEL_ARCH));
        assert!(!is_well_known("example.com/team"));
    }
}
