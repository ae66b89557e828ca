use async_trait::async_trait;
use marketplace_sdk::{ForumAnswer, ForumPost, NewForumAnswer, NewForumPost, VoteType};
use uuid::Uuid;

use crate::domain::error::DomainError;

#[async_trait]
pub trait ForumRepository: Send + Sync {
    /// Posts newest first, optionally restricted to one category.
    async fn list_posts(&self, category: Option<&str>) -> Result<Vec<ForumPost>, DomainError>;

    async fn get_post(&self, id: Uuid) -> Result<Option<ForumPost>, DomainError>;

    async fn create_post(&self, post: NewForumPost) -> Result<ForumPost, DomainError>;

    /// Answers of a post: best answer first, then by votes, then oldest first.
    async fn list_answers(&self, post_id: Uuid) -> Result<Vec<ForumAnswer>, DomainError>;

    async fn get_answer(&self, id: Uuid) -> Result<Option<ForumAnswer>, DomainError>;

    async fn create_answer(&self, answer: NewForumAnswer) -> Result<ForumAnswer, DomainError>;

    /// Insert or replace the vote of `user_id` on `answer_id` and store the
    /// recomputed tally. Returns the new tally.
    async fn upsert_vote(
        &self,
        answer_id: Uuid,
        user_id: Uuid,
        vote: VoteType,
    ) -> Result<i32, DomainError>;

    /// Mark `answer_id` as best, but only when `post_author_id` authored the
    /// answer's post. Clears other best markers of that post. Returns whether
    /// the conditional update matched.
    async fn mark_best_answer(
        &self,
        answer_id: Uuid,
        post_author_id: Uuid,
    ) -> Result<bool, DomainError>;
}
