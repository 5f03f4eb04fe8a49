use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::{
    factories::Implementation,
    inject::Parameter,
    registry::{Registry, Target},
    types::{ContractKey, TypeInfo},
};

/// Graph of every contract and what its implementations depend on.
/// Used to find parameters that can never be satisfied and dependency cycles ahead of resolution.
pub struct DependencyGraph {
    /// Entries in registration order
    entries: Vec<DependencyGraphEntry>,
    index: HashMap<ContractKey, usize>,
}
impl DependencyGraph {
    pub fn new(registry: &Registry) -> Self {
        let mut graph = Self {
            entries: Vec::new(),
            index: HashMap::new(),
        };

        for contract in registry.contracts() {
            let Some(descriptors) = registry.lookup(contract) else {
                continue;
            };

            for descriptor in descriptors {
                match &descriptor.target {
                    Target::Closed(implementation) => graph.add(*contract, implementation),
                    // Every specialization is checked under the closed contract it provides
                    Target::Open(template) => {
                        for specialization in template.specializations() {
                            graph.add(specialization.contract, &specialization.implementation);
                        }
                    }
                    Target::Instance(instance) => graph.entry(*contract).providers.push(Provider {
                        info: instance.info,
                        constructors: vec![],
                    }),
                }
            }
        }

        graph
    }

    fn entry(&mut self, contract: ContractKey) -> &mut DependencyGraphEntry {
        let position = *self.index.entry(contract).or_insert_with(|| {
            self.entries.push(DependencyGraphEntry {
                contract,
                providers: vec![],
            });
            self.entries.len() - 1
        });

        &mut self.entries[position]
    }

    fn add(&mut self, contract: ContractKey, implementation: &Implementation) {
        let constructors = implementation
            .constructors()
            .iter()
            .map(|c| c.parameters().to_vec())
            .collect();

        self.entry(contract).providers.push(Provider {
            info: implementation.info(),
            constructors,
        });
    }

    fn get(&self, contract: &ContractKey) -> Option<&DependencyGraphEntry> {
        self.index.get(contract).map(|position| &self.entries[*position])
    }

    /// Number of contracts in the graph
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Validate the graph
    ///
    /// Returns a report of all issues
    pub fn check(&self) -> Result<(), DependencyGraphReport> {
        let mut issues = Vec::new();

        for entry in &self.entries {
            for provider in &entry.providers {
                self.check_satisfiable(provider, &mut issues);
            }
        }

        let mut checked = HashSet::new();
        for entry in &self.entries {
            let mut chain = Vec::new();
            check_recurse(self, &mut checked, &mut issues, &mut chain, entry);
        }

        if !issues.is_empty() {
            return Err(DependencyGraphReport { issues });
        }

        return Ok(());

        fn check_recurse(
            graph: &DependencyGraph,
            checked: &mut HashSet<ContractKey>,
            issues: &mut Vec<DependencyGraphIssue>,
            chain: &mut Vec<ContractKey>,
            entry: &DependencyGraphEntry,
        ) {
            // Re-entering a contract resolves it as absent
            if chain.contains(&entry.contract) {
                let mut cycle = chain.clone();
                cycle.push(entry.contract);

                issues.push(DependencyGraphIssue::Cycle { chain: cycle });
                return;
            }

            // Skip other checks if already checked
            if !checked.insert(entry.contract) {
                return;
            }

            chain.push(entry.contract);

            for parameter in entry.parameters() {
                if let Some(next_entry) = graph.get(parameter.request.key()) {
                    check_recurse(graph, checked, issues, chain, next_entry);
                }
            }

            chain.pop();
        }
    }

    /// Reports the missing dependencies of a provider when none of its constructors can be satisfied
    fn check_satisfiable(&self, provider: &Provider, issues: &mut Vec<DependencyGraphIssue>) {
        let mut missing_per_constructor = provider.constructors.iter().map(|parameters| {
            parameters
                .iter()
                .filter(|p| !p.optional && p.fallback.is_none())
                .filter(|p| self.get(p.request.key()).is_none())
                .map(|p| *p.request.key())
                .collect::<Vec<_>>()
        });

        let Some(first_missing) = missing_per_constructor.next() else {
            return;
        };

        if first_missing.is_empty() || missing_per_constructor.any(|missing| missing.is_empty()) {
            return;
        }

        for dependency in first_missing {
            issues.push(DependencyGraphIssue::Unsatisfied {
                dependency,
                required_by: provider.info,
            });
        }
    }
}

struct DependencyGraphEntry {
    contract: ContractKey,
    providers: Vec<Provider>,
}
impl DependencyGraphEntry {
    fn parameters(&self) -> impl Iterator<Item = &Parameter> + '_ {
        self.providers
            .iter()
            .flat_map(|p| p.constructors.iter().flatten())
    }
}

struct Provider {
    info: TypeInfo,
    /// Parameters of every constructor
    constructors: Vec<Vec<Parameter>>,
}

#[derive(Error, Debug, Clone)]
pub enum DependencyGraphIssue {
    #[error("'{required_by}' needs '{dependency}' but it is missing")]
    Unsatisfied {
        dependency: ContractKey,
        required_by: TypeInfo,
    },
    #[error("A dependency cycle exists through {} - the re-entering dependency will be absent", display_chain(.chain))]
    Cycle { chain: Vec<ContractKey> },
}

fn display_chain(chain: &[ContractKey]) -> String {
    chain
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}

impl std::fmt::Display for DependencyGraphReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut display = Vec::new();
        display.push("The dependency graph had one or more issues:".to_string());
        for issue in &self.issues {
            display.push(format!("- {}", issue));
        }
        f.write_str(&display.join("\n"))
    }
}

#[derive(Error, Debug, Clone)]
pub struct DependencyGraphReport {
    pub issues: Vec<DependencyGraphIssue>,
}
