use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::format::job_view;
use crate::matching::match_score;
use crate::models::{Job, JobApplication, JobStats, JobStatus, JobSubmission, JobView};
use crate::storage::{load, modify, RecordStore, APPLICATIONS_COLLECTION, JOBS_COLLECTION};

use super::{next_id, require_non_blank, ServiceError, ServiceResult};

#[derive(Debug, Clone, Copy, Default)]
pub struct JobListing<'a> {
    pub requester_skills: Option<&'a [String]>,
    pub search: Option<&'a str>,
}

/// Active jobs with display fields and a match score for the requester. A
/// store failure yields an empty listing.
pub async fn list_active_jobs(
    store: &dyn RecordStore,
    listing: JobListing<'_>,
    now: DateTime<Utc>,
) -> Vec<JobView> {
    let jobs = match load::<Job>(store, JOBS_COLLECTION).await {
        Ok((_, jobs)) => jobs,
        Err(err) => {
            warn!(error = %err, "failed to read jobs, serving empty listing");
            return Vec::new();
        }
    };

    let query = listing
        .search
        .map(str::trim)
        .filter(|query| !query.is_empty())
        .map(str::to_lowercase);

    jobs.into_iter()
        .filter(|job| job.status == JobStatus::Active)
        .filter(|job| query.as_deref().map_or(true, |q| matches_search(job, q)))
        .map(|job| {
            let score = match_score(&job.skills, listing.requester_skills);
            job_view(job, now, Some(score))
        })
        .collect()
}

/// Job detail. Each call counts one view, persisted before the view is built.
pub async fn get_job_by_id(
    store: &dyn RecordStore,
    job_id: i64,
    now: DateTime<Utc>,
) -> ServiceResult<JobView> {
    let job = modify(store, JOBS_COLLECTION, |jobs: &mut Vec<Job>| {
        let job = jobs
            .iter_mut()
            .find(|job| job.id == job_id)
            .ok_or(ServiceError::NotFound("job"))?;
        job.views += 1;
        Ok::<_, ServiceError>(job.clone())
    })
    .await?;

    Ok(job_view(job, now, None))
}

pub async fn create_job(
    store: &dyn RecordStore,
    submission: JobSubmission,
    now: DateTime<Utc>,
) -> ServiceResult<JobView> {
    require_non_blank(&submission.title, "title")?;
    require_non_blank(&submission.company, "company")?;

    let skills = normalize_skills(submission.skills);
    let job = modify(store, JOBS_COLLECTION, |jobs: &mut Vec<Job>| {
        let job = Job {
            id: next_id(jobs.iter().map(|job| job.id).max(), now),
            title: submission.title.trim().to_string(),
            company: submission.company.trim().to_string(),
            location: submission.location.clone(),
            job_type: submission.job_type.clone(),
            salary_min: submission.salary_min.clone(),
            salary_max: submission.salary_max.clone(),
            description: submission.description.clone(),
            requirements: submission.requirements.clone(),
            benefits: submission.benefits.clone(),
            skills: skills.clone(),
            posted_at: now,
            status: JobStatus::Active,
            applicants: 0,
            views: 0,
            interested: 0,
        };
        jobs.push(job.clone());
        Ok::<_, ServiceError>(job)
    })
    .await?;

    info!(job_id = job.id, title = %job.title, company = %job.company, "job posted");
    Ok(job_view(job, now, None))
}

/// Totals across every job regardless of status. Unreadable collections count
/// as empty.
pub async fn job_stats(store: &dyn RecordStore) -> JobStats {
    let jobs = load::<Job>(store, JOBS_COLLECTION)
        .await
        .map(|(_, jobs)| jobs)
        .unwrap_or_else(|err| {
            warn!(error = %err, "failed to read jobs for stats");
            Vec::new()
        });
    let total_applications = load::<JobApplication>(store, APPLICATIONS_COLLECTION)
        .await
        .map(|(_, applications)| applications.len())
        .unwrap_or_else(|err| {
            warn!(error = %err, "failed to read applications for stats");
            0
        });

    JobStats {
        total_jobs: jobs.len(),
        total_applications,
        total_views: jobs.iter().map(|job| job.views).sum(),
        total_interested: jobs.iter().map(|job| job.interested).sum(),
    }
}

/// `query` must already be lowercase.
fn matches_search(job: &Job, query: &str) -> bool {
    job.title.to_lowercase().contains(query)
        || job.company.to_lowercase().contains(query)
        || job.location.to_lowercase().contains(query)
        || job
            .skills
            .iter()
            .any(|skill| skill.to_lowercase().contains(query))
}

fn normalize_skills(skills: Vec<String>) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(skills.len());
    for skill in skills {
        let skill = skill.trim();
        if !skill.is_empty() && !normalized.iter().any(|existing| existing == skill) {
            normalized.push(skill.to_string());
        }
    }
    normalized
}
