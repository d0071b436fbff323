use crate::error::DispatchError;
use crate::pool::ResourceSpec;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Parser, Clone, Debug, Serialize, Deserialize)]
#[command(author, version, about, long_about = None)]
#[group(id = "dispatch_config")]
pub struct Config {
	#[arg(
        long,
        env = "DISPATCH_RESOURCES",
        default_value = "cuda:0=2,cuda:1=2",
        value_delimiter = ',',
        value_parser = parse_resource_spec,
        help = "Comma list of name=capacity resource declarations, in routing tie-break order"
    )]
	pub resources: Vec<ResourceSpec>,

	#[arg(long, env = "WORKERS_PER_RESOURCE", default_value = "2", help = "Number of workers bound to each resource")]
	pub workers_per_resource: usize,

	#[arg(
        long = "task-timeout-secs",
        env = "TASK_TIMEOUT_SECS",
        default_value = "300",
        value_parser = parse_duration,
        help = "Upper bound on one task's fetch+transcribe+reply while holding a slot"
    )]
	pub task_timeout: Duration,
}

impl Config {
	pub fn validate(&self) -> Result<(), DispatchError> {
		if self.resources.is_empty() {
			return Err(DispatchError::InvalidResourceSpec("at least one resource is required".into()));
		}
		for spec in &self.resources {
			if spec.capacity == 0 {
				return Err(DispatchError::InvalidResourceSpec(format!("resource {} has zero capacity", spec.name)));
			}
		}
		if self.workers_per_resource == 0 {
			return Err(DispatchError::InvalidResourceSpec("workers_per_resource must be at least 1".into()));
		}
		Ok(())
	}

	#[cfg(test)]
	pub fn test() -> Self {
		Self {
			resources: vec![
				ResourceSpec {
					name: "cuda:0".into(),
					capacity: 2,
				},
				ResourceSpec {
					name: "cuda:1".into(),
					capacity: 2,
				},
			],
			workers_per_resource: 2,
			task_timeout: Duration::from_secs(5),
		}
	}
}

fn parse_resource_spec(s: &str) -> Result<ResourceSpec, String> {
	let (name, capacity) = s.split_once('=').ok_or_else(|| format!("expected name=capacity, got {s}"))?;
	let name = name.trim();
	if name.is_empty() {
		return Err(format!("empty resource name in {s}"));
	}
	let capacity = capacity.trim().parse::<usize>().map_err(|e| format!("bad capacity in {s}: {e}"))?;
	Ok(ResourceSpec { name: name.to_owned(), capacity })
}

fn parse_duration(s: &str) -> Result<Duration, std::num::ParseIntError> {
	s.parse::<u64>().map(Duration::from_secs)
}
