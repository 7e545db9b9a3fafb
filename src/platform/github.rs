//! GitHub platform service implementation

use crate::error::{Error, Result};
use crate::platform::{PlatformService, PrUpdate};
use crate::types::{
    AddCollaboratorOutcome, ChangedFile, Collaborator, Invitation, MergeMethod, MergeReadiness,
    MergeResult, OpenPullRequest, Permission, PlatformConfig, PrState, PullRequest,
    PullRequestDetails,
};
use async_trait::async_trait;
use octocrab::Octocrab;
use reqwest::{Client, Method, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

const PER_PAGE: usize = 100;

/// Fields requested back from the draft toggling mutations
const DRAFT_PR_FIELDS: &str = "number url baseRefName headRefName title body id isDraft";

#[derive(Deserialize)]
struct GraphQlEnvelope {
    data: Option<serde_json::Value>,
    #[serde(default)]
    errors: Vec<GraphQlMessage>,
}

#[derive(Deserialize)]
struct GraphQlMessage {
    message: String,
}

/// Pull request as returned inside a draft mutation payload
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MutatedPr {
    number: u64,
    url: String,
    base_ref_name: String,
    head_ref_name: String,
    title: String,
    body: Option<String>,
    id: String,
    is_draft: bool,
}

impl From<MutatedPr> for PullRequest {
    fn from(m: MutatedPr) -> Self {
        Self {
            number: m.number,
            html_url: m.url,
            base_ref: m.base_ref_name,
            head_ref: m.head_ref_name,
            title: m.title,
            body: m.body.filter(|b| !b.is_empty()),
            node_id: Some(m.id),
            is_draft: m.is_draft,
        }
    }
}

// REST response types for endpoints handled without octocrab

#[derive(Deserialize)]
struct RestUser {
    login: String,
}

#[derive(Deserialize)]
struct RestOpenPull {
    number: u64,
    #[serde(default)]
    requested_reviewers: Vec<RestUser>,
}

#[derive(Deserialize)]
struct RestCollaborator {
    login: String,
    role_name: Option<String>,
}

#[derive(Deserialize)]
struct RestInvitation {
    id: u64,
    invitee: Option<RestUser>,
    permissions: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Deserialize)]
struct RestBranch {
    name: String,
}

#[derive(Deserialize)]
struct CombinedStatus {
    state: String,
    total_count: u32,
}

#[derive(Deserialize)]
struct CheckRunPage {
    total_count: u32,
    check_runs: Vec<CheckRun>,
}

#[derive(Deserialize)]
struct CheckRun {
    name: Option<String>,
    status: String,
    conclusion: Option<String>,
}

impl CheckRun {
    fn passed(&self) -> bool {
        self.status == "completed"
            && matches!(
                self.conclusion.as_deref(),
                Some("success" | "neutral" | "skipped")
            )
    }
}

/// GitHub service using octocrab for pulls and raw REST for the rest
pub struct GitHubService {
    client: Octocrab,
    config: PlatformConfig,
    token: String,
    http_client: Client,
    /// `api.github.com` or `<enterprise host>/api/v3`
    api_root: String,
}

impl GitHubService {
    /// Build a service for `owner/repo`, optionally on a GitHub Enterprise host
    pub fn new(token: &str, owner: String, repo: String, host: Option<String>) -> Result<Self> {
        let api_root = match host.as_deref() {
            Some(h) => format!("{h}/api/v3"),
            None => "api.github.com".to_string(),
        };

        let mut octo = Octocrab::builder().personal_token(token.to_string());
        if host.is_some() {
            octo = octo
                .base_uri(format!("https://{api_root}"))
                .map_err(|e| Error::GitHubApi(format!("invalid enterprise host: {e}")))?;
        }
        let client = octo
            .build()
            .map_err(|e| Error::GitHubApi(format!("cannot build GitHub client: {e}")))?;

        let http_client = Client::builder()
            .user_agent(concat!("autopr/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::GitHubApi(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            client,
            config: PlatformConfig { owner, repo, host },
            token: token.to_string(),
            http_client,
            api_root,
        })
    }

    fn repo_url(&self, path: &str) -> String {
        format!(
            "https://{}/repos/{}/{}{path}",
            self.api_root, self.config.owner, self.config.repo
        )
    }

    /// Send a raw request, turning non-success statuses into errors
    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<&serde_json::Value>,
        what: &str,
    ) -> Result<reqwest::Response> {
        let mut request = self
            .http_client
            .request(method, url)
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request
            .send()
            .await
            .map_err(|e| Error::GitHubApi(format!("Failed to {what}: {e}")))?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&text)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_owned))
            .unwrap_or(text);
        Err(Error::GitHubApi(format!("Failed to {what} ({status}): {message}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, what: &str) -> Result<T> {
        self.send(Method::GET, url, None, what)
            .await?
            .json()
            .await
            .map_err(|e| Error::GitHubApi(format!("Failed to parse {what} response: {e}")))
    }

    /// Fetch every page of a list endpoint
    async fn get_all_pages<T: DeserializeOwned>(&self, path: &str, what: &str) -> Result<Vec<T>> {
        let sep = if path.contains('?') { '&' } else { '?' };
        let mut items = Vec::new();
        for page in 1.. {
            let url = self.repo_url(&format!("{path}{sep}per_page={PER_PAGE}&page={page}"));
            let batch: Vec<T> = self.get_json(&url, what).await?;
            let done = batch.len() < PER_PAGE;
            items.extend(batch);
            if done {
                break;
            }
        }
        Ok(items)
    }

    /// Run `markPullRequestReadyForReview` or `convertPullRequestToDraft`.
    ///
    /// Both mutations take the PR node id and return the same payload shape,
    /// so the payload is looked up by mutation name.
    async fn toggle_draft(&self, pr_number: u64, mutation: &str) -> Result<PullRequest> {
        let node_id = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .get(pr_number)
            .await?
            .node_id
            .ok_or_else(|| Error::GitHubApi(format!("PR #{pr_number} has no node id")))?;

        let query = format!(
            "mutation($id: ID!) {{ {mutation}(input: {{ pullRequestId: $id }}) {{ pullRequest {{ {DRAFT_PR_FIELDS} }} }} }}"
        );
        let envelope: GraphQlEnvelope = self
            .client
            .graphql(&serde_json::json!({ "query": query, "variables": { "id": node_id } }))
            .await
            .map_err(|e| Error::GitHubApi(format!("{mutation} request failed: {e}")))?;

        if !envelope.errors.is_empty() {
            let joined = envelope
                .errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(Error::GitHubApi(format!("{mutation} rejected: {joined}")));
        }

        let payload = envelope
            .data
            .and_then(|mut d| d.get_mut(mutation).map(serde_json::Value::take))
            .and_then(|mut p| p.get_mut("pullRequest").map(serde_json::Value::take))
            .ok_or_else(|| Error::GitHubApi(format!("{mutation} returned no pull request")))?;

        let pr: MutatedPr = serde_json::from_value(payload)?;
        Ok(pr.into())
    }

    /// Whether CI on `head` is green.
    ///
    /// Legacy commit statuses and check runs must both pass. A source with
    /// nothing configured, or one that cannot be read, does not block.
    async fn ci_green(&self, head: &str) -> bool {
        let encoded = urlencoding::encode(head);

        let statuses_ok = match self
            .get_json::<CombinedStatus>(
                &self.repo_url(&format!("/commits/{encoded}/status")),
                "fetch commit status",
            )
            .await
        {
            Ok(s) if s.total_count > 0 => {
                debug!(head, state = %s.state, "combined commit status");
                s.state == "success"
            }
            Ok(_) => true,
            Err(e) => {
                debug!(head, error = %e, "commit status unavailable");
                true
            }
        };

        let checks_ok = match self
            .get_json::<CheckRunPage>(
                &self.repo_url(&format!("/commits/{encoded}/check-runs")),
                "fetch check runs",
            )
            .await
        {
            Ok(page) if page.total_count > 0 => match page.check_runs.iter().find(|r| !r.passed()) {
                Some(run) => {
                    debug!(
                        head,
                        name = ?run.name,
                        status = %run.status,
                        conclusion = ?run.conclusion,
                        "check run not passing"
                    );
                    false
                }
                None => true,
            },
            Ok(_) => true,
            Err(e) => {
                debug!(head, error = %e, "check runs unavailable");
                true
            }
        };

        statuses_ok && checks_ok
    }
}

fn html_url_of(pr: &octocrab::models::pulls::PullRequest) -> String {
    pr.html_url.as_ref().map_or_else(String::new, |u| u.to_string())
}

impl From<&octocrab::models::pulls::PullRequest> for PullRequest {
    fn from(pr: &octocrab::models::pulls::PullRequest) -> Self {
        Self {
            number: pr.number,
            html_url: html_url_of(pr),
            base_ref: pr.base.ref_field.clone(),
            head_ref: pr.head.ref_field.clone(),
            title: pr.title.clone().unwrap_or_default(),
            body: pr.body.clone().filter(|b| !b.is_empty()),
            node_id: pr.node_id.clone(),
            is_draft: pr.draft == Some(true),
        }
    }
}

/// Lowercase merge state string, whatever shape octocrab models it as
fn mergeable_state_string<T: serde::Serialize>(state: Option<&T>) -> Option<String> {
    let value = serde_json::to_value(state?).ok()?;
    value.as_str().map(str::to_lowercase)
}

#[async_trait]
impl PlatformService for GitHubService {
    async fn find_existing_pr(&self, head_branch: &str) -> Result<Option<PullRequest>> {
        let page = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .list()
            .state(octocrab::params::State::Open)
            .head(format!("{}:{head_branch}", self.config.owner))
            .per_page(1)
            .send()
            .await?;

        let found = page.items.first().map(PullRequest::from);
        debug!(head_branch, pr = ?found.as_ref().map(|p| p.number), "open PR lookup");
        Ok(found)
    }

    async fn create_pr_with_options(
        &self,
        head: &str,
        base: &str,
        title: &str,
        body: Option<&str>,
        draft: bool,
    ) -> Result<PullRequest> {
        let pulls = self.client.pulls(&self.config.owner, &self.config.repo);
        let request = pulls.create(title, head, base).draft(draft);
        let created = match body {
            Some(text) => request.body(text).send().await?,
            None => request.send().await?,
        };

        let pr = PullRequest::from(&created);
        debug!(head, base, draft, pr_number = pr.number, "opened PR");
        Ok(pr)
    }

    async fn update_pr(&self, pr_number: u64, update: &PrUpdate) -> Result<PullRequest> {
        debug!(pr_number, ?update, "patching PR");
        let pulls = self.client.pulls(&self.config.owner, &self.config.repo);
        let mut builder = pulls.update(pr_number);
        if let Some(base) = &update.base {
            builder = builder.base(base);
        }
        if let Some(title) = &update.title {
            builder = builder.title(title);
        }
        if let Some(body) = &update.body {
            builder = builder.body(body);
        }
        let updated = builder.send().await?;
        Ok(PullRequest::from(&updated))
    }

    async fn publish_pr(&self, pr_number: u64) -> Result<PullRequest> {
        debug!(pr_number, "marking PR ready for review");
        self.toggle_draft(pr_number, "markPullRequestReadyForReview")
            .await
    }

    async fn convert_pr_to_draft(&self, pr_number: u64) -> Result<PullRequest> {
        debug!(pr_number, "moving PR back to draft");
        self.toggle_draft(pr_number, "convertPullRequestToDraft")
            .await
    }

    async fn get_pr_details(&self, pr_number: u64) -> Result<PullRequestDetails> {
        let pr = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .get(pr_number)
            .await
            .map_err(|e| {
                if let octocrab::Error::GitHub { source, .. } = &e
                    && source.status_code.as_u16() == StatusCode::NOT_FOUND.as_u16()
                {
                    return Error::PrNotFound(pr_number);
                }
                Error::from(e)
            })?;

        // Closed PRs with a merge timestamp were merged; IssueState is non-exhaustive
        let state = match (&pr.state, pr.merged_at) {
            (Some(octocrab::models::IssueState::Open), _) => PrState::Open,
            (_, Some(_)) => PrState::Merged,
            _ => PrState::Closed,
        };

        let details = PullRequestDetails {
            number: pr.number,
            title: pr.title.clone().unwrap_or_default(),
            body: pr.body.clone(),
            state,
            is_draft: pr.draft == Some(true),
            mergeable: pr.mergeable,
            mergeable_state: mergeable_state_string(pr.mergeable_state.as_ref()),
            head_ref: pr.head.ref_field.clone(),
            base_ref: pr.base.ref_field.clone(),
            author: pr.user.as_ref().map(|u| u.login.clone()),
            html_url: html_url_of(&pr),
        };

        debug!(
            pr_number,
            state = ?details.state,
            mergeable = ?details.mergeable,
            mergeable_state = ?details.mergeable_state,
            "fetched PR"
        );
        Ok(details)
    }

    async fn list_pr_files(&self, pr_number: u64) -> Result<Vec<ChangedFile>> {
        debug!(pr_number, "listing PR files");
        let files: Vec<ChangedFile> = self
            .get_all_pages(&format!("/pulls/{pr_number}/files"), "list PR files")
            .await?;
        debug!(pr_number, count = files.len(), "listed PR files");
        Ok(files)
    }

    async fn list_open_prs(&self) -> Result<Vec<OpenPullRequest>> {
        debug!("listing open PRs");
        let pulls: Vec<RestOpenPull> = self
            .get_all_pages("/pulls?state=open", "list open PRs")
            .await?;
        Ok(pulls
            .into_iter()
            .map(|p| OpenPullRequest {
                number: p.number,
                requested_reviewers: p.requested_reviewers.into_iter().map(|u| u.login).collect(),
            })
            .collect())
    }

    async fn request_reviewers(&self, pr_number: u64, reviewers: &[String]) -> Result<()> {
        if reviewers.is_empty() {
            return Ok(());
        }
        debug!(pr_number, ?reviewers, "requesting reviewers");
        let url = self.repo_url(&format!("/pulls/{pr_number}/requested_reviewers"));
        self.send(
            Method::POST,
            &url,
            Some(&serde_json::json!({ "reviewers": reviewers })),
            "request reviewers",
        )
        .await?;
        Ok(())
    }

    async fn add_labels(&self, pr_number: u64, labels: &[String]) -> Result<()> {
        if labels.is_empty() {
            return Ok(());
        }
        debug!(pr_number, ?labels, "adding labels");
        self.client
            .issues(&self.config.owner, &self.config.repo)
            .add_labels(pr_number, labels)
            .await?;
        Ok(())
    }

    async fn create_pr_comment(&self, pr_number: u64, body: &str) -> Result<()> {
        self.client
            .issues(&self.config.owner, &self.config.repo)
            .create_comment(pr_number, body)
            .await?;
        debug!(pr_number, bytes = body.len(), "posted PR comment");
        Ok(())
    }

    async fn check_merge_readiness(&self, pr_number: u64) -> Result<MergeReadiness> {
        let details = self.get_pr_details(pr_number).await?;

        let is_approved = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .list_reviews(pr_number)
            .send()
            .await?
            .items
            .iter()
            .filter_map(|review| review.state.as_ref())
            .any(|state| *state == octocrab::models::pulls::ReviewState::Approved);

        let ci_passed = self.ci_green(&details.head_ref).await;

        debug!(pr_number, is_approved, ci_passed, "merge readiness");
        Ok(MergeReadiness {
            is_approved,
            ci_passed,
        })
    }

    async fn merge_pr(&self, pr_number: u64, method: MergeMethod) -> Result<MergeResult> {
        use octocrab::params::pulls::MergeMethod as GhMethod;

        let pulls = self.client.pulls(&self.config.owner, &self.config.repo);
        let outcome = match method {
            // Squash commits carry the PR title and body
            MergeMethod::Squash => {
                let details = self.get_pr_details(pr_number).await?;
                let request = pulls
                    .merge(pr_number)
                    .method(GhMethod::Squash)
                    .title(format!("{} (#{pr_number})", details.title));
                match details.body.as_deref() {
                    Some(body) => request.message(body).send().await,
                    None => request.send().await,
                }
            }
            MergeMethod::Merge => pulls.merge(pr_number).method(GhMethod::Merge).send().await,
            MergeMethod::Rebase => pulls.merge(pr_number).method(GhMethod::Rebase).send().await,
        }
        .map_err(|e| Error::GitHubApi(format!("merge of PR #{pr_number} failed: {e}")))?;

        debug!(
            pr_number,
            %method,
            merged = outcome.merged,
            sha = ?outcome.sha,
            "merge request answered"
        );
        Ok(MergeResult {
            merged: outcome.merged,
            sha: outcome.sha,
            message: outcome.message,
        })
    }

    async fn list_branches(&self) -> Result<Vec<String>> {
        debug!("listing branches");
        let branches: Vec<RestBranch> = self.get_all_pages("/branches", "list branches").await?;
        Ok(branches.into_iter().map(|b| b.name).collect())
    }

    async fn delete_branch(&self, branch: &str) -> Result<()> {
        debug!(branch, "deleting remote branch");
        let url = self.repo_url(&format!("/git/refs/heads/{}", urlencoding::encode(branch)));
        self.send(Method::DELETE, &url, None, "delete branch").await?;
        Ok(())
    }

    async fn list_collaborators(&self) -> Result<Vec<Collaborator>> {
        debug!("listing collaborators");
        let collaborators: Vec<RestCollaborator> = self
            .get_all_pages("/collaborators", "list collaborators")
            .await?;
        debug!(count = collaborators.len(), "listed collaborators");
        Ok(collaborators
            .into_iter()
            .map(|c| Collaborator {
                login: c.login,
                permission: c.role_name,
            })
            .collect())
    }

    async fn add_collaborator(
        &self,
        login: &str,
        permission: Permission,
    ) -> Result<AddCollaboratorOutcome> {
        debug!(login, permission = permission.as_str(), "adding collaborator");
        let url = self.repo_url(&format!("/collaborators/{}", urlencoding::encode(login)));
        let response = self
            .send(
                Method::PUT,
                &url,
                Some(&serde_json::json!({ "permission": permission.as_str() })),
                "add collaborator",
            )
            .await?;

        // 201 carries the invitation, 204 means the user already has access
        if response.status() == StatusCode::CREATED {
            let invitation: RestInvitation = response.json().await.map_err(|e| {
                Error::GitHubApi(format!("Failed to parse invitation response: {e}"))
            })?;
            Ok(AddCollaboratorOutcome::Invited(invitation.id))
        } else {
            Ok(AddCollaboratorOutcome::AlreadyCollaborator)
        }
    }

    async fn remove_collaborator(&self, login: &str) -> Result<()> {
        debug!(login, "removing collaborator");
        let url = self.repo_url(&format!("/collaborators/{}", urlencoding::encode(login)));
        self.send(Method::DELETE, &url, None, "remove collaborator")
            .await?;
        Ok(())
    }

    async fn list_invitations(&self) -> Result<Vec<Invitation>> {
        debug!("listing invitations");
        let invitations: Vec<RestInvitation> = self
            .get_all_pages("/invitations", "list invitations")
            .await?;
        Ok(invitations
            .into_iter()
            .map(|i| Invitation {
                id: i.id,
                invitee: i.invitee.map(|u| u.login),
                permissions: i.permissions,
                created_at: i.created_at,
            })
            .collect())
    }

    async fn cancel_invitation(&self, invitation_id: u64) -> Result<()> {
        debug!(invitation_id, "cancelling invitation");
        let url = self.repo_url(&format!("/invitations/{invitation_id}"));
        self.send(Method::DELETE, &url, None, "cancel invitation")
            .await?;
        Ok(())
    }

    async fn current_user(&self) -> Result<String> {
        let url = format!("https://{}/user", self.api_root);
        let user: RestUser = self.get_json(&url, "fetch authenticated user").await?;
        Ok(user.login)
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}
