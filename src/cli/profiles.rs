//! The `profiles` command: list saved requirement profiles.

use crate::cli::common::{print_json, CliResult};
use crate::models::{Metric, PriorityRanking, RequirementProfile};
use crate::services::RequirementProfileStore;
use clap::Args;
use serde::Serialize;

/// List saved requirement profiles
#[derive(Debug, Clone, Args)]
pub struct ProfilesArgs {
    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct ProfileItem {
    name: String,
    profile: RequirementProfile,
}

#[derive(Debug, Serialize)]
struct ProfilesResponse {
    default: RequirementProfile,
    profiles: Vec<ProfileItem>,
    ranking: PriorityRanking,
}

impl ProfilesArgs {
    /// Execute the profiles command
    pub fn execute(&self) -> CliResult<()> {
        let store = RequirementProfileStore::new();
        let response = ProfilesResponse {
            default: *store.active(),
            profiles: store
                .entries()
                .map(|(name, profile)| ProfileItem {
                    name: name.to_string(),
                    profile: *profile,
                })
                .collect(),
            ranking: *store.ranking(),
        };

        if self.json {
            return print_json(&response);
        }

        print_profile("(session default)", &response.default);
        for item in &response.profiles {
            print_profile(&item.name, &item.profile);
        }
        println!("Priority ranking:");
        for (criterion, rank) in response.ranking.entries() {
            println!("  {rank}. {}", criterion.label());
        }
        Ok(())
    }
}

fn print_profile(name: &str, profile: &RequirementProfile) {
    println!("{name}");
    for metric in Metric::ALL {
        let c = profile.criterion(metric);
        println!(
            "  {:<10} {} {} ± {} {}",
            metric.label(),
            c.op,
            c.threshold,
            c.tolerance,
            metric.unit()
        );
    }
    println!();
}
