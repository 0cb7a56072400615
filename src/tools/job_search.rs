//! `search_jobs`: look up open positions through a pluggable job source.

use super::traits::{ParamSpec, ParamType, Tool, ToolDescriptor, ToolError};
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

pub const NAME: &str = "search_jobs";

const DEFAULT_LOCATION: &str = "United States";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobListing {
    pub title: String,
    pub company: String,
    pub location: String,
    pub salary: String,
    pub description: String,
    pub requirements: Vec<String>,
}

/// Backing service for job search. Returning an empty list is a normal outcome.
#[async_trait]
pub trait JobSource: Send + Sync {
    async fn search(&self, job_title: &str, location: &str) -> Result<Vec<JobListing>>;

    /// Role names this source knows about, offered to the model on a miss.
    fn known_roles(&self) -> Vec<String> {
        Vec::new()
    }
}

/// In-process job catalog keyed by lowercase role name.
#[derive(Debug, Clone, Default)]
pub struct StaticJobCatalog {
    roles: Vec<(String, Vec<JobListing>)>,
}

fn listing(
    title: &str,
    company: &str,
    location: &str,
    salary: &str,
    description: &str,
    requirements: &[&str],
) -> JobListing {
    JobListing {
        title: title.into(),
        company: company.into(),
        location: location.into(),
        salary: salary.into(),
        description: description.into(),
        requirements: requirements.iter().map(|r| r.to_string()).collect(),
    }
}

impl StaticJobCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_role(mut self, role: &str, jobs: Vec<JobListing>) -> Self {
        self.roles.push((role.to_lowercase(), jobs));
        self
    }

    /// Sample listings for the demo registry.
    pub fn sample() -> Self {
        Self::new()
            .with_role(
                "data scientist",
                vec![
                    listing(
                        "Data Scientist",
                        "Google",
                        "Mountain View, CA",
                        "$150k-$200k",
                        "Build ML models for search and recommendation systems.",
                        &["Python", "Machine Learning", "Statistics", "SQL"],
                    ),
                    listing(
                        "Senior Data Scientist",
                        "Meta",
                        "Menlo Park, CA",
                        "$160k-$220k",
                        "Work on AI systems for billions of users.",
                        &["Python", "Deep Learning", "TensorFlow", "Big Data"],
                    ),
                    listing(
                        "ML Data Scientist",
                        "Apple",
                        "Cupertino, CA",
                        "$140k-$190k",
                        "Build machine learning systems for iOS.",
                        &["Python", "Machine Learning", "Statistics", "System Design"],
                    ),
                ],
            )
            .with_role(
                "ai engineer",
                vec![
                    listing(
                        "AI Engineer",
                        "OpenAI",
                        "San Francisco, CA",
                        "$180k-$250k",
                        "Build large language models and AI systems.",
                        &["Python", "Deep Learning", "LLMs", "Transformers"],
                    ),
                    listing(
                        "Machine Learning Engineer",
                        "Anthropic",
                        "San Francisco, CA",
                        "$170k-$230k",
                        "Develop and deploy AI models.",
                        &["Python", "Deep Learning", "LLMs", "MLOps"],
                    ),
                ],
            )
            .with_role(
                "ml engineer",
                vec![listing(
                    "ML Engineer",
                    "LinkedIn",
                    "Sunnyvale, CA",
                    "$160k-$210k",
                    "Build recommendation systems at scale.",
                    &["Python", "TensorFlow", "System Design", "Cloud"],
                )],
            )
    }
}

#[async_trait]
impl JobSource for StaticJobCatalog {
    async fn search(&self, job_title: &str, _location: &str) -> Result<Vec<JobListing>> {
        let key = job_title.trim().to_lowercase();
        Ok(self
            .roles
            .iter()
            .find(|(role, _)| *role == key)
            .map(|(_, jobs)| jobs.clone())
            .unwrap_or_default())
    }

    fn known_roles(&self) -> Vec<String> {
        self.roles.iter().map(|(role, _)| role.clone()).collect()
    }
}

pub struct JobSearchTool {
    source: Arc<dyn JobSource>,
}

impl JobSearchTool {
    pub fn new(source: Arc<dyn JobSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Tool for JobSearchTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(NAME, "Search current job postings for a job title.")
            .param(
                "job_title",
                ParamSpec::required(
                    ParamType::String,
                    "Job title (Data Scientist, AI Engineer, ML Engineer, ...)",
                ),
            )
            .param(
                "location",
                ParamSpec::optional(ParamType::String, "Location. Default: United States"),
            )
    }

    async fn execute(&self, args: &Value) -> Result<Value, ToolError> {
        let job_title = args["job_title"].as_str().unwrap_or_default();
        let location = args
            .get("location")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_LOCATION);

        let jobs = self.source.search(job_title, location).await?;

        if jobs.is_empty() {
            return Ok(json!({
                "status": "no_results",
                "message": format!("No jobs found for \"{job_title}\" in {location}"),
                "available_roles": self.source.known_roles(),
            }));
        }

        Ok(json!({
            "status": "success",
            "query": job_title,
            "location": location,
            "total_jobs": jobs.len(),
            "jobs": jobs,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lookup_is_case_insensitive() {
        let jobs = StaticJobCatalog::sample()
            .search("Data Scientist", "Remote")
            .await
            .unwrap();
        assert_eq!(jobs.len(), 3);
        assert_eq!(jobs[1].company, "Meta");
    }

    #[tokio::test]
    async fn miss_is_a_normal_result() {
        let tool = JobSearchTool::new(Arc::new(StaticJobCatalog::sample()));
        let value = tool
            .execute(&json!({ "job_title": "Astronaut" }))
            .await
            .unwrap();
        assert_eq!(value["status"], "no_results");
        assert_eq!(value["available_roles"].as_array().unwrap().len(), 3);
        assert!(value["message"].as_str().unwrap().contains("United States"));
    }

    #[tokio::test]
    async fn hit_reports_listings() {
        let tool = JobSearchTool::new(Arc::new(StaticJobCatalog::sample()));
        let value = tool
            .execute(&json!({ "job_title": "ML Engineer", "location": "Sunnyvale" }))
            .await
            .unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["total_jobs"], 1);
        assert_eq!(value["jobs"][0]["company"], "LinkedIn");
    }
}
