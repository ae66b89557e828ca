use async_trait::async_trait;
use marketplace_sdk::{ForumAnswer, ForumPost, NewForumAnswer, NewForumPost, VoteType};
use sea_orm::sea_query::{Expr, OnConflict, Query};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};
use time::OffsetDateTime;
use uuid::Uuid;

use super::db_err;
use super::entity::{forum_answer, forum_post, forum_vote};
use super::mapper::{parse_label, to_json, try_collect};
use crate::domain::error::DomainError;
use crate::domain::repos::ForumRepository;

/// `SeaORM` implementation of `ForumRepository`.
pub struct SeaOrmForumRepository {
    db: DatabaseConnection,
}

impl SeaOrmForumRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ForumRepository for SeaOrmForumRepository {
    async fn list_posts(&self, category: Option<&str>) -> Result<Vec<ForumPost>, DomainError> {
        let mut query = forum_post::Entity::find();
        if let Some(category) = category {
            query = query.filter(forum_post::Column::Category.eq(category));
        }
        let rows = query
            .order_by_desc(forum_post::Column::CreatedAt)
            .order_by_desc(forum_post::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        try_collect(rows)
    }

    async fn get_post(&self, id: Uuid) -> Result<Option<ForumPost>, DomainError> {
        forum_post::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(ForumPost::try_from)
            .transpose()
    }

    async fn create_post(&self, post: NewForumPost) -> Result<ForumPost, DomainError> {
        let now = OffsetDateTime::now_utc();
        let model = forum_post::ActiveModel {
            id: Set(Uuid::now_v7()),
            author_id: Set(post.author_id),
            title: Set(post.title),
            content: Set(post.content),
            category: Set(post.category),
            tags: Set(to_json("forum_posts.tags", &post.tags)?),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(db_err)?;
        ForumPost::try_from(model)
    }

    async fn list_answers(&self, post_id: Uuid) -> Result<Vec<ForumAnswer>, DomainError> {
        let rows = forum_answer::Entity::find()
            .filter(forum_answer::Column::PostId.eq(post_id))
            .order_by_desc(forum_answer::Column::IsBest)
            .order_by_desc(forum_answer::Column::Votes)
            .order_by_asc(forum_answer::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(ForumAnswer::from).collect())
    }

    async fn get_answer(&self, id: Uuid) -> Result<Option<ForumAnswer>, DomainError> {
        Ok(forum_answer::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(ForumAnswer::from))
    }

    async fn create_answer(&self, answer: NewForumAnswer) -> Result<ForumAnswer, DomainError> {
        let now = OffsetDateTime::now_utc();
        let model = forum_answer::ActiveModel {
            id: Set(Uuid::now_v7()),
            post_id: Set(answer.post_id),
            author_id: Set(answer.author_id),
            content: Set(answer.content),
            votes: Set(0),
            is_best: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(db_err)?;
        Ok(model.into())
    }

    async fn upsert_vote(
        &self,
        answer_id: Uuid,
        user_id: Uuid,
        vote: VoteType,
    ) -> Result<i32, DomainError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        forum_vote::Entity::insert(forum_vote::ActiveModel {
            answer_id: Set(answer_id),
            user_id: Set(user_id),
            vote_type: Set(vote.as_str().to_owned()),
            created_at: Set(OffsetDateTime::now_utc()),
        })
        .on_conflict(
            OnConflict::columns([forum_vote::Column::AnswerId, forum_vote::Column::UserId])
                .update_column(forum_vote::Column::VoteType)
                .to_owned(),
        )
        .exec_without_returning(&txn)
        .await
        .map_err(db_err)?;

        let tally = forum_vote::Entity::find()
            .filter(forum_vote::Column::AnswerId.eq(answer_id))
            .all(&txn)
            .await
            .map_err(db_err)?
            .iter()
            .map(|v| {
                parse_label::<VoteType>("forum_votes.vote_type", &v.vote_type)
                    .map(VoteType::weight)
            })
            .sum::<Result<i32, DomainError>>()?;

        forum_answer::Entity::update_many()
            .col_expr(forum_answer::Column::Votes, Expr::value(tally))
            .filter(forum_answer::Column::Id.eq(answer_id))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        Ok(tally)
    }

    async fn mark_best_answer(
        &self,
        answer_id: Uuid,
        post_author_id: Uuid,
    ) -> Result<bool, DomainError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let Some(answer) = forum_answer::Entity::find_by_id(answer_id)
            .one(&txn)
            .await
            .map_err(db_err)?
        else {
            return Ok(false);
        };

        let marked = forum_answer::Entity::update_many()
            .col_expr(forum_answer::Column::IsBest, Expr::value(true))
            .col_expr(
                forum_answer::Column::UpdatedAt,
                Expr::value(OffsetDateTime::now_utc()),
            )
            .filter(forum_answer::Column::Id.eq(answer_id))
            .filter(
                forum_answer::Column::PostId.in_subquery(
                    Query::select()
                        .column(forum_post::Column::Id)
                        .from(forum_post::Entity)
                        .and_where(forum_post::Column::AuthorId.eq(post_author_id))
                        .to_owned(),
                ),
            )
            .exec(&txn)
            .await
            .map_err(db_err)?;
        if marked.rows_affected == 0 {
            return Ok(false);
        }

        forum_answer::Entity::update_many()
            .col_expr(forum_answer::Column::IsBest, Expr::value(false))
            .filter(forum_answer::Column::PostId.eq(answer.post_id))
            .filter(forum_answer::Column::Id.ne(answer_id))
            .filter(forum_answer::Column::IsBest.eq(true))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        Ok(true)
    }
}
