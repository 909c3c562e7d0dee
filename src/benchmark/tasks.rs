//! Random benchmark instance generation
//!
//! Instances are ordered by size and then by index within a size, with ids
//! numbered from 1 across the whole set. The values are random unless a seed
//! is configured.

use crate::error::ConfigError;
use crate::permutation::Permutation;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Default benchmark sizes
pub const DEFAULT_SIZES: [usize; 6] = [5, 10, 15, 20, 25, 30];

/// Permutations generated per size by default
pub const DEFAULT_INSTANCES_PER_SIZE: usize = 10;

/// One permutation to sort
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub id: u32,
    pub size: usize,
    pub permutation: Permutation,
}

impl Instance {
    pub fn new(id: u32, permutation: Permutation) -> Self {
        Self {
            id,
            size: permutation.len(),
            permutation,
        }
    }
}

/// Generator for random instance sets
#[derive(Debug, Clone)]
pub struct TaskGenerator {
    sizes: Vec<usize>,
    per_size: usize,
    seed: Option<u64>,
}

impl Default for TaskGenerator {
    fn default() -> Self {
        Self {
            sizes: DEFAULT_SIZES.to_vec(),
            per_size: DEFAULT_INSTANCES_PER_SIZE,
            seed: None,
        }
    }
}

impl TaskGenerator {
    pub fn with_sizes(mut self, sizes: Vec<usize>) -> Self {
        self.sizes = sizes;
        self
    }

    pub fn with_per_size(mut self, per_size: usize) -> Self {
        self.per_size = per_size;
        self
    }

    pub fn with_seed_option(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Produce `per_size` uniform shuffles for each size, in size order
    pub fn generate(&self) -> Result<InstanceSet, ConfigError> {
        if self.sizes.is_empty() {
            return Err(ConfigError::InvalidSizes("no sizes given".to_string()));
        }
        if let Some(zero) = self.sizes.iter().find(|&&n| n == 0) {
            return Err(ConfigError::InvalidSizes(format!(
                "size {} is not allowed, sizes must be at least 1",
                zero
            )));
        }
        if self.per_size == 0 {
            return Err(ConfigError::InvalidSizes(
                "instances per size must be at least 1".to_string(),
            ));
        }

        let mut rng: ChaCha8Rng = match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_os_rng(),
        };

        let mut instances = Vec::with_capacity(self.sizes.len() * self.per_size);
        let mut next_id = 1u32;
        for &size in &self.sizes {
            for _ in 0..self.per_size {
                let mut values: Vec<usize> = (1..=size).collect();
                values.shuffle(&mut rng);
                // a shuffle of 1..=size is always a valid permutation
                let permutation = Permutation::new(values)
                    .map_err(|source| ConfigError::InvalidInstance { id: next_id, source })?;
                instances.push(Instance::new(next_id, permutation));
                next_id += 1;
            }
        }

        tracing::debug!(
            count = instances.len(),
            seeded = self.seed.is_some(),
            "generated benchmark instances"
        );
        Ok(InstanceSet { instances })
    }
}

/// Ordered collection of benchmark instances, serializable to TOML
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceSet {
    #[serde(default, rename = "instance")]
    pub instances: Vec<Instance>,
}

#[derive(Deserialize)]
struct RawInstance {
    id: u32,
    size: Option<usize>,
    permutation: Vec<usize>,
}

#[derive(Deserialize)]
struct RawInstanceSet {
    #[serde(default, rename = "instance")]
    instances: Vec<RawInstance>,
}

impl InstanceSet {
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Instance> {
        self.instances.iter()
    }

    pub fn as_slice(&self) -> &[Instance] {
        &self.instances
    }

    /// Parse and validate an instance file
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let raw: RawInstanceSet = toml::from_str(s)?;
        let mut ids = HashSet::new();
        let mut instances = Vec::with_capacity(raw.instances.len());

        for item in raw.instances {
            if !ids.insert(item.id) {
                return Err(ConfigError::Invalid(format!(
                    "instance id {} appears more than once",
                    item.id
                )));
            }
            let permutation = Permutation::new(item.permutation)
                .map_err(|source| ConfigError::InvalidInstance { id: item.id, source })?;
            if let Some(size) = item.size {
                if size != permutation.len() {
                    return Err(ConfigError::Invalid(format!(
                        "instance #{} declares size {} but has {} values",
                        item.id,
                        size,
                        permutation.len()
                    )));
                }
            }
            instances.push(Instance::new(item.id, permutation));
        }

        if instances.is_empty() {
            return Err(ConfigError::Invalid(
                "instance file contains no instances".to_string(),
            ));
        }
        Ok(Self { instances })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }
}

impl<'a> IntoIterator for &'a InstanceSet {
    type Item = &'a Instance;
    type IntoIter = std::slice::Iter<'a, Instance>;

    fn into_iter(self) -> Self::IntoIter {
        self.instances.iter()
    }
}
