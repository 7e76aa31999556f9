//! Graph checks over a built [`Deployment`].
//!
//! The engine resolves `dependsOn` by name, so a graph is only runnable when
//! names are unique, every edge resolves, and the edges are acyclic.

use crate::error::{Error, Result};
use crate::types::Deployment;
use std::collections::{HashMap, HashSet};

impl Deployment {
    /// Check that names are unique and every `dependsOn` target exists.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.resources.len());
        for resource in &self.resources {
            if !seen.insert(resource.name.as_str()) {
                return Err(Error::DuplicateName(resource.name.clone()));
            }
        }

        for resource in &self.resources {
            for target in resource.depends_on() {
                if !seen.contains(target.as_str()) {
                    return Err(Error::UnknownDependency {
                        resource: resource.name.clone(),
                        target: target.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Group descriptor names into waves in dependency order.
    ///
    /// Every descriptor in a wave depends only on descriptors in earlier
    /// waves. Within a wave, names keep their output order.
    pub fn execution_order(&self) -> Result<Vec<Vec<String>>> {
        self.validate()?;

        // Kahn's algorithm, one frontier at a time
        let index: HashMap<&str, usize> = self
            .resources
            .iter()
            .enumerate()
            .map(|(i, r)| (r.name.as_str(), i))
            .collect();

        let mut in_degree = vec![0usize; self.resources.len()];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); self.resources.len()];
        for (i, resource) in self.resources.iter().enumerate() {
            for target in resource.depends_on() {
                let Some(&dep) = index.get(target.as_str()) else {
                    continue;
                };
                in_degree[i] += 1;
                dependents[dep].push(i);
            }
        }

        let mut frontier: Vec<usize> = (0..self.resources.len())
            .filter(|&i| in_degree[i] == 0)
            .collect();
        let mut waves = Vec::new();
        let mut placed = 0;

        while !frontier.is_empty() {
            placed += frontier.len();
            let mut next = Vec::new();
            for &i in &frontier {
                for &d in &dependents[i] {
                    in_degree[d] -= 1;
                    if in_degree[d] == 0 {
                        next.push(d);
                    }
                }
            }
            next.sort_unstable();
            waves.push(
                frontier
                    .iter()
                    .map(|&i| self.resources[i].name.clone())
                    .collect(),
            );
            frontier = next;
        }

        if placed != self.resources.len() {
            let stuck = self
                .resources
                .iter()
                .enumerate()
                .filter(|(i, _)| in_degree[*i] > 0)
                .map(|(_, r)| r.name.clone())
                .collect();
            return Err(Error::Cycle(stuck));
        }

        Ok(waves)
    }
}
