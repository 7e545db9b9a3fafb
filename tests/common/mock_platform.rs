//! In-memory `PlatformService` double
//!
//! Each test binary uses a different subset of the helpers.

#![allow(dead_code)]

use async_trait::async_trait;
use autopr::error::{Error, Result};
use autopr::platform::{PlatformService, PrUpdate};
use autopr::types::{
    AddCollaboratorOutcome, ChangedFile, Collaborator, FileStatus, Invitation, MergeMethod,
    MergeReadiness, MergeResult, OpenPullRequest, Permission, PlatformConfig, PrState,
    PullRequest, PullRequestDetails,
};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Call record for `create_pr_with_options`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePrCall {
    pub head: String,
    pub base: String,
    pub title: String,
    pub body: Option<String>,
    pub draft: bool,
}

/// Call record for `update_pr`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePrCall {
    pub pr_number: u64,
    pub update: PrUpdate,
}

/// Call record for `request_reviewers` and `add_labels`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListCall {
    pub pr_number: u64,
    pub values: Vec<String>,
}

/// Call record for `merge_pr`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergePrCall {
    pub pr_number: u64,
    pub method: MergeMethod,
}

/// Hand-written platform double.
///
/// Responses are keyed by branch or PR number, every call is recorded, and
/// any operation can be told to fail. `get_pr_details` answers from a queue
/// so tests can play GitHub still computing mergeability.
pub struct MockPlatformService {
    config: PlatformConfig,
    next_pr_number: AtomicU64,
    find_pr_responses: Mutex<HashMap<String, Option<PullRequest>>>,
    pr_details_responses: Mutex<HashMap<u64, VecDeque<PullRequestDetails>>>,
    pr_files_responses: Mutex<HashMap<u64, Vec<ChangedFile>>>,
    merge_readiness_responses: Mutex<HashMap<u64, MergeReadiness>>,
    merge_responses: Mutex<HashMap<u64, MergeResult>>,
    open_prs: Mutex<Vec<OpenPullRequest>>,
    collaborators: Mutex<Vec<Collaborator>>,
    current_user: Mutex<String>,
    // Call tracking
    find_pr_calls: Mutex<Vec<String>>,
    create_pr_calls: Mutex<Vec<CreatePrCall>>,
    update_pr_calls: Mutex<Vec<UpdatePrCall>>,
    publish_calls: Mutex<Vec<u64>>,
    convert_to_draft_calls: Mutex<Vec<u64>>,
    get_pr_details_calls: Mutex<Vec<u64>>,
    list_pr_files_calls: Mutex<Vec<u64>>,
    list_open_prs_calls: Mutex<usize>,
    request_reviewers_calls: Mutex<Vec<ListCall>>,
    add_labels_calls: Mutex<Vec<ListCall>>,
    merge_pr_calls: Mutex<Vec<MergePrCall>>,
    delete_branch_calls: Mutex<Vec<String>>,
    list_collaborators_calls: Mutex<usize>,
    comment_calls: Mutex<Vec<(u64, String)>>,
    /// Operation name to the error it should return
    failures: Mutex<HashMap<&'static str, String>>,
}

fn pr_url(number: u64) -> String {
    format!("https://github.com/test/repo/pull/{number}")
}

/// Open, mergeable PR details
pub fn details(number: u64, head: &str) -> PullRequestDetails {
    PullRequestDetails {
        number,
        title: format!("PR {number}"),
        body: Some("PR body".to_string()),
        state: PrState::Open,
        is_draft: false,
        mergeable: Some(true),
        mergeable_state: Some("clean".to_string()),
        head_ref: head.to_string(),
        base_ref: "main".to_string(),
        author: Some("author".to_string()),
        html_url: pr_url(number),
    }
}

/// A changed file
pub fn changed_file(name: &str, status: FileStatus) -> ChangedFile {
    ChangedFile {
        filename: name.to_string(),
        status,
        additions: 1,
        deletions: 1,
        patch: Some("@@ -1 +1 @@\n-a\n+b".to_string()),
    }
}

/// A collaborator login
pub fn collaborator(login: &str) -> Collaborator {
    Collaborator {
        login: login.to_string(),
        permission: Some("write".to_string()),
    }
}

impl MockPlatformService {
    /// Create a new mock with the given config
    pub fn with_config(config: PlatformConfig) -> Self {
        Self {
            config,
            next_pr_number: AtomicU64::new(1),
            find_pr_responses: Mutex::new(HashMap::new()),
            pr_details_responses: Mutex::new(HashMap::new()),
            pr_files_responses: Mutex::new(HashMap::new()),
            merge_readiness_responses: Mutex::new(HashMap::new()),
            merge_responses: Mutex::new(HashMap::new()),
            open_prs: Mutex::new(Vec::new()),
            collaborators: Mutex::new(Vec::new()),
            current_user: Mutex::new("author".to_string()),
            find_pr_calls: Mutex::new(Vec::new()),
            create_pr_calls: Mutex::new(Vec::new()),
            update_pr_calls: Mutex::new(Vec::new()),
            publish_calls: Mutex::new(Vec::new()),
            convert_to_draft_calls: Mutex::new(Vec::new()),
            get_pr_details_calls: Mutex::new(Vec::new()),
            list_pr_files_calls: Mutex::new(Vec::new()),
            list_open_prs_calls: Mutex::new(0),
            request_reviewers_calls: Mutex::new(Vec::new()),
            add_labels_calls: Mutex::new(Vec::new()),
            merge_pr_calls: Mutex::new(Vec::new()),
            delete_branch_calls: Mutex::new(Vec::new()),
            list_collaborators_calls: Mutex::new(0),
            comment_calls: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
        }
    }

    // === Failure injection ===

    fn fail(&self, op: &'static str, msg: &str) {
        self.failures.lock().unwrap().insert(op, msg.to_string());
    }

    fn check_failure(&self, op: &str) -> Result<()> {
        match self.failures.lock().unwrap().get(op) {
            Some(msg) => Err(Error::Platform(msg.clone())),
            None => Ok(()),
        }
    }

    pub fn fail_create_pr(&self, msg: &str) {
        self.fail("create_pr", msg);
    }

    pub fn fail_list_open_prs(&self, msg: &str) {
        self.fail("list_open_prs", msg);
    }

    pub fn fail_list_collaborators(&self, msg: &str) {
        self.fail("list_collaborators", msg);
    }

    pub fn fail_request_reviewers(&self, msg: &str) {
        self.fail("request_reviewers", msg);
    }

    pub fn fail_add_labels(&self, msg: &str) {
        self.fail("add_labels", msg);
    }

    pub fn fail_merge_pr(&self, msg: &str) {
        self.fail("merge_pr", msg);
    }

    pub fn fail_delete_branch(&self, msg: &str) {
        self.fail("delete_branch", msg);
    }

    // === Response setup ===

    /// Set the response for `find_existing_pr` for a specific branch
    pub fn set_find_pr_response(&self, branch: &str, pr: Option<PullRequest>) {
        self.find_pr_responses
            .lock()
            .unwrap()
            .insert(branch.to_string(), pr);
    }

    /// Set the response for `get_pr_details` for a specific PR
    pub fn set_pr_details_response(&self, pr_number: u64, details: PullRequestDetails) {
        self.pr_details_responses
            .lock()
            .unwrap()
            .insert(pr_number, VecDeque::from([details]));
    }

    /// Queue another `get_pr_details` response; the last one repeats
    pub fn push_pr_details_response(&self, pr_number: u64, details: PullRequestDetails) {
        self.pr_details_responses
            .lock()
            .unwrap()
            .entry(pr_number)
            .or_default()
            .push_back(details);
    }

    /// Set the files of a PR
    pub fn set_pr_files_response(&self, pr_number: u64, files: Vec<ChangedFile>) {
        self.pr_files_responses
            .lock()
            .unwrap()
            .insert(pr_number, files);
    }

    /// Set the response for `check_merge_readiness` for a specific PR
    pub fn set_merge_readiness_response(&self, pr_number: u64, readiness: MergeReadiness) {
        self.merge_readiness_responses
            .lock()
            .unwrap()
            .insert(pr_number, readiness);
    }

    /// Set the response for `merge_pr` for a specific PR
    pub fn set_merge_response(&self, pr_number: u64, result: MergeResult) {
        self.merge_responses
            .lock()
            .unwrap()
            .insert(pr_number, result);
    }

    /// Add an open PR waiting on the given reviewers
    pub fn add_open_pr(&self, number: u64, requested_reviewers: &[&str]) {
        self.open_prs.lock().unwrap().push(OpenPullRequest {
            number,
            requested_reviewers: requested_reviewers.iter().map(ToString::to_string).collect(),
        });
    }

    /// Set repository collaborators
    pub fn set_collaborators(&self, logins: &[&str]) {
        *self.collaborators.lock().unwrap() = logins.iter().map(|l| collaborator(l)).collect();
    }

    /// Set the authenticated user
    pub fn set_current_user(&self, login: &str) {
        *self.current_user.lock().unwrap() = login.to_string();
    }

    /// Helper to set up an open PR for a branch with all merge responses
    pub fn setup_mergeable_pr(&self, pr_number: u64, branch: &str, title: &str) {
        let mut pr = stub_pr(pr_number, false);
        branch.clone_into(&mut pr.head_ref);
        title.clone_into(&mut pr.title);
        self.set_find_pr_response(branch, Some(pr));

        let mut d = details(pr_number, branch);
        d.title = title.to_string();
        self.set_pr_details_response(pr_number, d);

        self.set_merge_readiness_response(
            pr_number,
            MergeReadiness {
                is_approved: true,
                ci_passed: true,
            },
        );

        self.set_merge_response(
            pr_number,
            MergeResult {
                merged: true,
                sha: Some(format!("merged_sha_{pr_number}")),
                message: None,
            },
        );
    }

    /// Helper to set up a PR whose merge state is dirty
    pub fn setup_conflicting_pr(&self, pr_number: u64, branch: &str, files: Vec<ChangedFile>) {
        self.setup_mergeable_pr(pr_number, branch, "Conflicting PR");
        let mut d = details(pr_number, branch);
        d.mergeable = Some(false);
        d.mergeable_state = Some("dirty".to_string());
        self.set_pr_details_response(pr_number, d);
        self.set_pr_files_response(pr_number, files);
    }

    // === Call verification methods ===

    /// Get all branches that `find_existing_pr` was called with
    pub fn get_find_pr_calls(&self) -> Vec<String> {
        self.find_pr_calls.lock().unwrap().clone()
    }

    /// Get all `create_pr_with_options` calls
    pub fn get_create_pr_calls(&self) -> Vec<CreatePrCall> {
        self.create_pr_calls.lock().unwrap().clone()
    }

    /// Get all `update_pr` calls
    pub fn get_update_pr_calls(&self) -> Vec<UpdatePrCall> {
        self.update_pr_calls.lock().unwrap().clone()
    }

    /// Get all `publish_pr` calls
    pub fn get_publish_calls(&self) -> Vec<u64> {
        self.publish_calls.lock().unwrap().clone()
    }

    /// Get all `convert_pr_to_draft` calls
    pub fn get_convert_to_draft_calls(&self) -> Vec<u64> {
        self.convert_to_draft_calls.lock().unwrap().clone()
    }

    /// Get all `get_pr_details` calls
    pub fn get_pr_details_calls(&self) -> Vec<u64> {
        self.get_pr_details_calls.lock().unwrap().clone()
    }

    /// Get all `list_pr_files` calls
    pub fn get_list_pr_files_calls(&self) -> Vec<u64> {
        self.list_pr_files_calls.lock().unwrap().clone()
    }

    /// Number of `list_open_prs` calls
    pub fn list_open_prs_call_count(&self) -> usize {
        *self.list_open_prs_calls.lock().unwrap()
    }

    /// Get all `request_reviewers` calls
    pub fn get_request_reviewers_calls(&self) -> Vec<ListCall> {
        self.request_reviewers_calls.lock().unwrap().clone()
    }

    /// Get all `add_labels` calls
    pub fn get_add_labels_calls(&self) -> Vec<ListCall> {
        self.add_labels_calls.lock().unwrap().clone()
    }

    /// Get all `merge_pr` calls
    pub fn get_merge_pr_calls(&self) -> Vec<MergePrCall> {
        self.merge_pr_calls.lock().unwrap().clone()
    }

    /// Get all `delete_branch` calls
    pub fn get_delete_branch_calls(&self) -> Vec<String> {
        self.delete_branch_calls.lock().unwrap().clone()
    }

    /// Number of `list_collaborators` calls
    pub fn list_collaborators_call_count(&self) -> usize {
        *self.list_collaborators_calls.lock().unwrap()
    }

    /// Get all `create_pr_comment` calls
    pub fn get_comment_calls(&self) -> Vec<(u64, String)> {
        self.comment_calls.lock().unwrap().clone()
    }

    /// Assert that `create_pr_with_options` was called with specific head and base
    pub fn assert_create_pr_called(&self, head: &str, base: &str) {
        let calls = self.get_create_pr_calls();
        assert!(
            calls.iter().any(|c| c.head == head && c.base == base),
            "Expected create_pr({head}, {base}) but got: {calls:?}"
        );
    }

    /// Assert that `merge_pr` was called for a specific PR
    pub fn assert_merge_called(&self, pr_number: u64) {
        let calls = self.get_merge_pr_calls();
        assert!(
            calls.iter().any(|c| c.pr_number == pr_number),
            "Expected merge_pr({pr_number}) but got: {calls:?}"
        );
    }

    /// Assert that `merge_pr` was NOT called for a specific PR
    pub fn assert_merge_not_called(&self, pr_number: u64) {
        let calls = self.get_merge_pr_calls();
        assert!(
            !calls.iter().any(|c| c.pr_number == pr_number),
            "Expected merge_pr({pr_number}) NOT to be called but it was: {calls:?}"
        );
    }

}

fn stub_pr(number: u64, is_draft: bool) -> PullRequest {
    PullRequest {
        number,
        html_url: pr_url(number),
        base_ref: "main".to_string(),
        head_ref: format!("branch-{number}"),
        title: format!("PR {number}"),
        body: None,
        node_id: Some(format!("node-{number}")),
        is_draft,
    }
}

#[async_trait]
impl PlatformService for MockPlatformService {
    async fn find_existing_pr(&self, head_branch: &str) -> Result<Option<PullRequest>> {
        self.find_pr_calls
            .lock()
            .unwrap()
            .push(head_branch.to_string());

        Ok(self
            .find_pr_responses
            .lock()
            .unwrap()
            .get(head_branch)
            .cloned()
            .flatten())
    }

    async fn create_pr_with_options(
        &self,
        head: &str,
        base: &str,
        title: &str,
        body: Option<&str>,
        draft: bool,
    ) -> Result<PullRequest> {
        self.create_pr_calls.lock().unwrap().push(CreatePrCall {
            head: head.to_string(),
            base: base.to_string(),
            title: title.to_string(),
            body: body.map(ToString::to_string),
            draft,
        });

        self.check_failure("create_pr")?;

        let mut pr = stub_pr(self.next_pr_number.fetch_add(1, Ordering::SeqCst), draft);
        base.clone_into(&mut pr.base_ref);
        head.clone_into(&mut pr.head_ref);
        title.clone_into(&mut pr.title);
        pr.body = body.map(ToString::to_string);
        Ok(pr)
    }

    async fn update_pr(&self, pr_number: u64, update: &PrUpdate) -> Result<PullRequest> {
        self.update_pr_calls.lock().unwrap().push(UpdatePrCall {
            pr_number,
            update: update.clone(),
        });
        let mut pr = stub_pr(pr_number, false);
        if let Some(base) = &update.base {
            pr.base_ref.clone_from(base);
        }
        if let Some(title) = &update.title {
            pr.title.clone_from(title);
        }
        if update.body.is_some() {
            pr.body.clone_from(&update.body);
        }
        Ok(pr)
    }

    async fn publish_pr(&self, pr_number: u64) -> Result<PullRequest> {
        self.publish_calls.lock().unwrap().push(pr_number);
        Ok(stub_pr(pr_number, false))
    }

    async fn convert_pr_to_draft(&self, pr_number: u64) -> Result<PullRequest> {
        self.convert_to_draft_calls.lock().unwrap().push(pr_number);
        Ok(stub_pr(pr_number, true))
    }

    async fn get_pr_details(&self, pr_number: u64) -> Result<PullRequestDetails> {
        self.get_pr_details_calls.lock().unwrap().push(pr_number);

        let mut responses = self.pr_details_responses.lock().unwrap();
        let queue = responses
            .get_mut(&pr_number)
            .ok_or(Error::PrNotFound(pr_number))?;
        if queue.len() > 1 {
            return queue.pop_front().ok_or(Error::PrNotFound(pr_number));
        }
        queue.front().cloned().ok_or(Error::PrNotFound(pr_number))
    }

    async fn list_pr_files(&self, pr_number: u64) -> Result<Vec<ChangedFile>> {
        self.list_pr_files_calls.lock().unwrap().push(pr_number);
        let responses = self.pr_files_responses.lock().unwrap();
        Ok(responses.get(&pr_number).cloned().unwrap_or_default())
    }

    async fn list_open_prs(&self) -> Result<Vec<OpenPullRequest>> {
        *self.list_open_prs_calls.lock().unwrap() += 1;
        self.check_failure("list_open_prs")?;
        Ok(self.open_prs.lock().unwrap().clone())
    }

    async fn request_reviewers(&self, pr_number: u64, reviewers: &[String]) -> Result<()> {
        self.request_reviewers_calls.lock().unwrap().push(ListCall {
            pr_number,
            values: reviewers.to_vec(),
        });
        self.check_failure("request_reviewers")
    }

    async fn add_labels(&self, pr_number: u64, labels: &[String]) -> Result<()> {
        self.add_labels_calls.lock().unwrap().push(ListCall {
            pr_number,
            values: labels.to_vec(),
        });
        self.check_failure("add_labels")
    }

    async fn create_pr_comment(&self, pr_number: u64, body: &str) -> Result<()> {
        self.comment_calls
            .lock()
            .unwrap()
            .push((pr_number, body.to_string()));
        Ok(())
    }

    async fn check_merge_readiness(&self, pr_number: u64) -> Result<MergeReadiness> {
        self.merge_readiness_responses
            .lock()
            .unwrap()
            .get(&pr_number)
            .cloned()
            .ok_or_else(|| Error::Platform(format!("no readiness stubbed for #{pr_number}")))
    }

    async fn merge_pr(&self, pr_number: u64, method: MergeMethod) -> Result<MergeResult> {
        self.merge_pr_calls
            .lock()
            .unwrap()
            .push(MergePrCall { pr_number, method });

        self.check_failure("merge_pr")?;

        self.merge_responses
            .lock()
            .unwrap()
            .get(&pr_number)
            .cloned()
            .ok_or_else(|| Error::Platform(format!("no merge result stubbed for #{pr_number}")))
    }

    async fn list_branches(&self) -> Result<Vec<String>> {
        Ok(vec!["main".to_string()])
    }

    async fn delete_branch(&self, branch: &str) -> Result<()> {
        self.delete_branch_calls
            .lock()
            .unwrap()
            .push(branch.to_string());
        self.check_failure("delete_branch")
    }

    async fn list_collaborators(&self) -> Result<Vec<Collaborator>> {
        *self.list_collaborators_calls.lock().unwrap() += 1;
        self.check_failure("list_collaborators")?;
        Ok(self.collaborators.lock().unwrap().clone())
    }

    async fn add_collaborator(
        &self,
        login: &str,
        _permission: Permission,
    ) -> Result<AddCollaboratorOutcome> {
        let mut collaborators = self.collaborators.lock().unwrap();
        if collaborators.iter().any(|c| c.login == login) {
            return Ok(AddCollaboratorOutcome::AlreadyCollaborator);
        }
        collaborators.push(collaborator(login));
        Ok(AddCollaboratorOutcome::Invited(1))
    }

    async fn remove_collaborator(&self, login: &str) -> Result<()> {
        self.collaborators
            .lock()
            .unwrap()
            .retain(|c| c.login != login);
        Ok(())
    }

    async fn list_invitations(&self) -> Result<Vec<Invitation>> {
        Ok(Vec::new())
    }

    async fn cancel_invitation(&self, _invitation_id: u64) -> Result<()> {
        Ok(())
    }

    async fn current_user(&self) -> Result<String> {
        Ok(self.current_user.lock().unwrap().clone())
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}
