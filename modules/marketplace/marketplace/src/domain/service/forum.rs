use std::sync::Arc;

use ifrof_security::Caller;
use marketplace_sdk::{
    ForumAnswer, ForumPost, NewForumAnswer, NewForumPost, NewNotification, NotificationType,
    VoteType,
};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::repos::ForumRepository;
use crate::domain::service::NotificationsService;

pub struct ForumService {
    repo: Arc<dyn ForumRepository>,
    notifications: Arc<NotificationsService>,
}

impl ForumService {
    pub fn new(repo: Arc<dyn ForumRepository>, notifications: Arc<NotificationsService>) -> Self {
        Self {
            repo,
            notifications,
        }
    }

    pub async fn list_posts(&self, category: Option<&str>) -> Result<Vec<ForumPost>, DomainError> {
        self.repo.list_posts(category).await
    }

    pub async fn get_post(&self, id: Uuid) -> Result<Option<ForumPost>, DomainError> {
        self.repo.get_post(id).await
    }

    pub async fn get_answers(&self, post_id: Uuid) -> Result<Vec<ForumAnswer>, DomainError> {
        self.repo.list_answers(post_id).await
    }

    #[instrument(skip(self, caller, title, content, tags), fields(author_id = %caller.id()))]
    pub async fn create_post(
        &self,
        caller: &Caller,
        title: String,
        content: String,
        category: Option<String>,
        tags: Vec<String>,
    ) -> Result<ForumPost, DomainError> {
        let post = self
            .repo
            .create_post(NewForumPost {
                author_id: caller.id(),
                title,
                content,
                category,
                tags,
            })
            .await?;
        info!(post_id = %post.id, "Created forum post");
        Ok(post)
    }

    /// The referenced post is not required to exist. Its author, when there is
    /// one other than the caller, gets a notification.
    #[instrument(skip(self, caller, content), fields(author_id = %caller.id(), post_id = %post_id))]
    pub async fn create_answer(
        &self,
        caller: &Caller,
        post_id: Uuid,
        content: String,
    ) -> Result<ForumAnswer, DomainError> {
        let answer = self
            .repo
            .create_answer(NewForumAnswer {
                post_id,
                author_id: caller.id(),
                content,
            })
            .await?;

        match self.repo.get_post(post_id).await {
            Ok(Some(post)) if post.author_id != caller.id() => {
                self.notifications
                    .notify_best_effort(NewNotification {
                        user_id: post.author_id,
                        kind: NotificationType::Forum,
                        title: "New answer".to_owned(),
                        message: format!("Your post \"{}\" received a new answer", post.title),
                        link: Some(format!("/forum/{post_id}")),
                    })
                    .await;
            }
            Ok(_) => {}
            Err(e) => debug!(error = %e, "Skipping answer notification"),
        }

        Ok(answer)
    }

    /// Records the caller's vote, replacing an earlier one. Returns the new tally.
    #[instrument(
        skip(self, caller),
        fields(user_id = %caller.id(), answer_id = %answer_id, vote = %vote)
    )]
    pub async fn vote_answer(
        &self,
        caller: &Caller,
        answer_id: Uuid,
        vote: VoteType,
    ) -> Result<i32, DomainError> {
        if self.repo.get_answer(answer_id).await?.is_none() {
            return Err(DomainError::not_found("Answer", answer_id));
        }
        let votes = self.repo.upsert_vote(answer_id, caller.id(), vote).await?;
        debug!(votes, "Recorded vote");
        Ok(votes)
    }

    /// Only the author of the answer's post can pick the best answer; the
    /// store enforces it, so a foreign post reads as a missing answer.
    #[instrument(skip(self, caller), fields(user_id = %caller.id(), answer_id = %answer_id))]
    pub async fn mark_best_answer(
        &self,
        caller: &Caller,
        answer_id: Uuid,
    ) -> Result<(), DomainError> {
        if self.repo.mark_best_answer(answer_id, caller.id()).await? {
            info!("Marked best answer");
            Ok(())
        } else {
            Err(DomainError::not_found("Answer", answer_id))
        }
    }
}
