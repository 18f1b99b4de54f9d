use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::models::{
    ApplicationOutcome, ApplicationStatus, ApplicationSubmission, ApplyOutcome, Job,
    JobApplication, DEFAULT_MATCH_SCORE,
};
use crate::storage::{load, modify, RecordStore, APPLICATIONS_COLLECTION, JOBS_COLLECTION};

use super::{next_id, require_non_blank, ServiceError, ServiceResult};

const APPLICATION_SUBMITTED: &str = "Application submitted successfully";

/// Files an application against an existing job and counts it on the job.
/// The applications collection is checked for readability before the job is
/// touched, and the job's count is released again if the append fails.
pub async fn apply_to_job(
    store: &dyn RecordStore,
    job_id: i64,
    submission: ApplicationSubmission,
    now: DateTime<Utc>,
) -> ServiceResult<ApplyOutcome> {
    require_non_blank(&submission.candidate_name, "candidateName")?;
    require_non_blank(&submission.candidate_email, "candidateEmail")?;
    store.read(APPLICATIONS_COLLECTION).await?;

    let job_title = modify(store, JOBS_COLLECTION, |jobs: &mut Vec<Job>| {
        let job = jobs
            .iter_mut()
            .find(|job| job.id == job_id)
            .ok_or(ServiceError::NotFound("job"))?;
        job.applicants += 1;
        Ok::<_, ServiceError>(job.title.clone())
    })
    .await?;

    let appended = modify(
        store,
        APPLICATIONS_COLLECTION,
        |applications: &mut Vec<JobApplication>| {
            let application = JobApplication {
                id: next_id(applications.iter().map(|app| app.id).max(), now),
                job_id,
                job_title: job_title.clone(),
                candidate_name: submission.candidate_name.clone(),
                candidate_email: submission.candidate_email.clone(),
                candidate_phone: submission.candidate_phone.clone(),
                experience: submission.experience.clone(),
                skills: submission.skills.clone(),
                applied_at: now,
                status: ApplicationStatus::Pending,
                resume_url: submission.resume_url.clone(),
                cover_letter: submission.cover_letter.clone(),
                match_score: submission
                    .match_score
                    .filter(|score| *score > 0)
                    .unwrap_or(DEFAULT_MATCH_SCORE),
            };
            applications.push(application.clone());
            Ok::<_, ServiceError>(application)
        },
    )
    .await;

    let application = match appended {
        Ok(application) => application,
        Err(err) => {
            if let Err(undo) = release_applicant_slot(store, job_id).await {
                error!(job_id, error = %undo, "failed to release applicant count after failed apply");
            }
            return Err(err);
        }
    };

    info!(
        application_id = application.id,
        job_id,
        candidate = %application.candidate_email,
        "application submitted"
    );

    Ok(ApplyOutcome {
        success: true,
        message: APPLICATION_SUBMITTED.to_string(),
        application,
    })
}

/// Applications filed against `job_id`. An unknown job simply has none.
pub async fn get_job_applications(
    store: &dyn RecordStore,
    job_id: i64,
) -> ServiceResult<Vec<JobApplication>> {
    let (_, applications) = load::<JobApplication>(store, APPLICATIONS_COLLECTION).await?;
    Ok(applications
        .into_iter()
        .filter(|app| app.job_id == job_id)
        .collect())
}

/// Applications whose candidate email equals `email` exactly. Only a missing
/// or empty email is rejected.
pub async fn get_user_applications(
    store: &dyn RecordStore,
    email: Option<&str>,
) -> ServiceResult<Vec<JobApplication>> {
    let email = match email {
        Some(email) if !email.is_empty() => email,
        _ => return Err(ServiceError::Validation("User email required".to_string())),
    };

    let applications = match load::<JobApplication>(store, APPLICATIONS_COLLECTION).await {
        Ok((_, applications)) => applications,
        Err(err) => {
            warn!(error = %err, "failed to read applications, serving empty list");
            return Ok(Vec::new());
        }
    };

    Ok(applications
        .into_iter()
        .filter(|app| app.candidate_email == email)
        .collect())
}

/// Replaces the status of one application. `status` must name one of the
/// recognized states.
pub async fn update_application_status(
    store: &dyn RecordStore,
    application_id: i64,
    status: &str,
) -> ServiceResult<ApplicationOutcome> {
    let status: ApplicationStatus = status.parse().map_err(ServiceError::Validation)?;

    let application = modify(
        store,
        APPLICATIONS_COLLECTION,
        |applications: &mut Vec<JobApplication>| {
            let application = applications
                .iter_mut()
                .find(|app| app.id == application_id)
                .ok_or(ServiceError::NotFound("application"))?;
            application.status = status;
            Ok::<_, ServiceError>(application.clone())
        },
    )
    .await?;

    info!(application_id, status = %status, "application status updated");
    Ok(ApplicationOutcome {
        success: true,
        application,
    })
}

/// Removes an application and releases its slot on the job's applicant
/// counter. A dangling job reference is tolerated.
pub async fn withdraw_application(
    store: &dyn RecordStore,
    application_id: i64,
) -> ServiceResult<ApplicationOutcome> {
    let application = modify(
        store,
        APPLICATIONS_COLLECTION,
        |applications: &mut Vec<JobApplication>| {
            let index = applications
                .iter()
                .position(|app| app.id == application_id)
                .ok_or(ServiceError::NotFound("application"))?;
            Ok::<_, ServiceError>(applications.remove(index))
        },
    )
    .await?;

    let job_id = application.job_id;
    match release_applicant_slot(store, job_id).await {
        Ok(()) => {}
        Err(ServiceError::NotFound(_)) => {
            warn!(application_id, job_id, "withdrawn application referenced a missing job");
        }
        Err(err) => return Err(err),
    }

    info!(application_id, job_id, "application withdrawn");
    Ok(ApplicationOutcome {
        success: true,
        application,
    })
}

async fn release_applicant_slot(store: &dyn RecordStore, job_id: i64) -> ServiceResult<()> {
    modify(store, JOBS_COLLECTION, |jobs: &mut Vec<Job>| {
        let job = jobs
            .iter_mut()
            .find(|job| job.id == job_id)
            .ok_or(ServiceError::NotFound("job"))?;
        job.applicants = job.applicants.saturating_sub(1);
        Ok(())
    })
    .await
}
