//! Reviewer selection for a matched branch pattern
//!
//! The reviewer set is the union of the pattern's direct reviewers, one
//! member per referenced group (picked by the group's rotation strategy) and,
//! when the pattern asks for it, the project's default reviewers. The result
//! is filtered against the repository's collaborators.
//!
//! Group selection never fails: a broken rotation file or a failed
//! open-PR query degrades that group to a random pick.

mod rotation;
mod state;

pub use rotation::{least_busy_index, next_round_robin, random_index, review_load};
pub use state::{RotationState, RotationStore};

use crate::cache::{COLLABORATORS_TTL, TtlCache};
use crate::config::{BranchPattern, ProjectConfig, ReviewerGroup, RotationStrategy};
use crate::error::Result;
use crate::platform::PlatformService;
use crate::types::Collaborator;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

/// Collaborator lists cached per repository for fifteen minutes
#[derive(Debug, Clone)]
pub struct CollaboratorCache {
    cache: TtlCache<Vec<Collaborator>>,
}

impl Default for CollaboratorCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CollaboratorCache {
    /// Empty cache with the standard TTL
    pub fn new() -> Self {
        Self {
            cache: TtlCache::new(COLLABORATORS_TTL),
        }
    }

    /// Collaborators of the platform's repository, from cache when fresh
    pub async fn get(&mut self, platform: &dyn PlatformService) -> Result<Vec<Collaborator>> {
        let key = platform.config().slug();
        if let Some(hit) = self.cache.get(&key) {
            debug!(repo = %key, "collaborators cache hit");
            return Ok(hit);
        }
        let collaborators = platform.list_collaborators().await?;
        self.cache.insert(key, collaborators.clone());
        Ok(collaborators)
    }

    /// Forget the cached list (after adding or removing collaborators)
    pub fn invalidate(&mut self, platform: &dyn PlatformService) {
        self.cache.invalidate(&platform.config().slug());
    }
}

/// Reviewers chosen for a PR
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewerSelection {
    /// Confirmed collaborators to request
    pub reviewers: Vec<String>,
    /// Candidates dropped because they are not collaborators
    pub dropped: Vec<String>,
}

/// Computes reviewer sets, owning rotation persistence and collaborator cache
#[derive(Debug)]
pub struct ReviewerSelector<R = StdRng> {
    rotation: RotationStore,
    collaborators: CollaboratorCache,
    rng: R,
}

impl ReviewerSelector<StdRng> {
    /// Selector with an entropy-seeded RNG
    pub fn new(rotation: RotationStore) -> Self {
        Self::with_rng(rotation, StdRng::from_entropy())
    }
}

impl<R: Rng> ReviewerSelector<R> {
    /// Selector with an explicit RNG (deterministic tests)
    pub fn with_rng(rotation: RotationStore, rng: R) -> Self {
        Self {
            rotation,
            collaborators: CollaboratorCache::new(),
            rng,
        }
    }

    /// Collaborator cache shared with collaborator commands
    pub fn collaborators(&mut self) -> &mut CollaboratorCache {
        &mut self.collaborators
    }

    /// Compute the reviewer set for a matched pattern
    ///
    /// `author` is excluded from the result since GitHub rejects
    /// self-review requests.
    #[allow(clippy::future_not_send)]
    pub async fn select_reviewers(
        &mut self,
        pattern: &BranchPattern,
        project: &ProjectConfig,
        platform: &dyn PlatformService,
        author: Option<&str>,
    ) -> ReviewerSelection {
        let mut candidates: Vec<String> = Vec::new();

        for reviewer in &pattern.reviewers {
            push_unique(&mut candidates, reviewer);
        }

        for group_name in &pattern.reviewer_groups {
            let Some(group) = project.find_reviewer_group(group_name) else {
                warn!(group = %group_name, "reviewer group referenced by pattern is not defined");
                continue;
            };
            if let Some(member) = self.pick_member(group, platform).await {
                push_unique(&mut candidates, &member);
            }
        }

        if pattern.auto_assign_reviewers {
            for reviewer in &project.default_reviewers {
                push_unique(&mut candidates, reviewer);
            }
        }

        if let Some(author) = author {
            candidates.retain(|c| !c.eq_ignore_ascii_case(author));
        }

        if candidates.is_empty() {
            return ReviewerSelection::default();
        }

        match self.collaborators.get(platform).await {
            Ok(collaborators) => filter_collaborators(candidates, &collaborators),
            Err(e) => {
                warn!(error = %e, "could not list collaborators, requesting reviewers unfiltered");
                ReviewerSelection {
                    reviewers: candidates,
                    dropped: Vec::new(),
                }
            }
        }
    }

    /// Pick one member of a group according to its strategy
    ///
    /// Returns `None` only for a group without members.
    #[allow(clippy::future_not_send)]
    pub async fn pick_member(
        &mut self,
        group: &ReviewerGroup,
        platform: &dyn PlatformService,
    ) -> Option<String> {
        let members: Vec<String> = group
            .members
            .iter()
            .filter(|m| !m.trim().is_empty())
            .cloned()
            .collect();
        if members.is_empty() {
            warn!(group = %group.name, "reviewer group has no members");
            return None;
        }

        let index = match group.rotation_strategy {
            RotationStrategy::Random => random_index(members.len(), &mut self.rng),
            RotationStrategy::RoundRobin => self.round_robin(&group.name, members.len()),
            RotationStrategy::LeastBusy => match platform.list_open_prs().await {
                Ok(open_prs) => least_busy_index(&members, &open_prs),
                Err(e) => {
                    warn!(group = %group.name, error = %e, "least-busy lookup failed, picking at random");
                    random_index(members.len(), &mut self.rng)
                }
            },
        };

        debug!(group = %group.name, strategy = %group.rotation_strategy, member = %members[index], "picked reviewer");
        Some(members[index].clone())
    }

    fn round_robin(&mut self, group: &str, len: usize) -> usize {
        let mut state = match self.rotation.load() {
            Ok(state) => state,
            Err(e) => {
                warn!(group, error = %e, "rotation state unreadable, picking at random");
                return random_index(len, &mut self.rng);
            }
        };

        let index = next_round_robin(state.last_index(group), len);
        state.set_last_index(group, index);

        if let Err(e) = self.rotation.save(&state) {
            warn!(group, error = %e, "rotation state not saved, picking at random");
            return random_index(len, &mut self.rng);
        }
        index
    }
}

fn push_unique(list: &mut Vec<String>, login: &str) {
    let login = login.trim();
    if !login.is_empty() && !list.iter().any(|l| l.eq_ignore_ascii_case(login)) {
        list.push(login.to_string());
    }
}

/// Split candidates into collaborators and dropped names, logging each drop
pub fn filter_collaborators(
    candidates: Vec<String>,
    collaborators: &[Collaborator],
) -> ReviewerSelection {
    let (reviewers, dropped): (Vec<String>, Vec<String>) =
        candidates.into_iter().partition(|c| {
            collaborators
                .iter()
                .any(|collab| collab.login.eq_ignore_ascii_case(c))
        });
    for name in &dropped {
        warn!(reviewer = %name, "not a collaborator, dropping from reviewers");
    }
    ReviewerSelection { reviewers, dropped }
}
