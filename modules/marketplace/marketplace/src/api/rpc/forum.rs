use std::sync::Arc;

use ifrof_rpc::{
    CallContext, ProcedureBuilder, ProcedureRegistry, RegistryError, RpcError, Success,
};
use marketplace_sdk::{ForumAnswer, ForumPost};

use super::bind;
use super::dto::{
    AnswerIdInput, CreateAnswerInput, CreatePostInput, IdInput, ListPostsInput, PostIdInput,
    VoteAnswerInput, VoteResult,
};
use crate::domain::service::AppServices;

pub(super) fn register(
    registry: &mut ProcedureRegistry,
    services: &Arc<AppServices>,
) -> Result<(), RegistryError> {
    ProcedureBuilder::<ListPostsInput, Vec<ForumPost>>::query("forum.listPosts")
        .summary("Posts newest first, optionally in one category")
        .public()
        .handler(bind(services, list_posts))
        .register(registry)?;

    ProcedureBuilder::<IdInput, Option<ForumPost>>::query("forum.getPost")
        .public()
        .handler(bind(services, get_post))
        .register(registry)?;

    ProcedureBuilder::<PostIdInput, Vec<ForumAnswer>>::query("forum.getAnswers")
        .summary("Answers of a post, best first, then by votes")
        .public()
        .handler(bind(services, get_answers))
        .register(registry)?;

    ProcedureBuilder::<CreatePostInput, ForumPost>::mutation("forum.createPost")
        .authenticated()
        .handler(bind(services, create_post))
        .register(registry)?;

    ProcedureBuilder::<CreateAnswerInput, ForumAnswer>::mutation("forum.createAnswer")
        .authenticated()
        .handler(bind(services, create_answer))
        .register(registry)?;

    ProcedureBuilder::<VoteAnswerInput, VoteResult>::mutation("forum.voteAnswer")
        .summary("Record the caller's vote and return the new tally")
        .authenticated()
        .handler(bind(services, vote_answer))
        .register(registry)?;

    ProcedureBuilder::<AnswerIdInput, Success>::mutation("forum.markBestAnswer")
        .summary("Only the author of the question may pick the best answer")
        .authenticated()
        .handler(bind(services, mark_best_answer))
        .register(registry)
}

async fn list_posts(
    svc: Arc<AppServices>,
    _ctx: CallContext,
    input: ListPostsInput,
) -> Result<Vec<ForumPost>, RpcError> {
    let category = input.category();
    Ok(svc.forum.list_posts(category.as_deref()).await?)
}

async fn get_post(
    svc: Arc<AppServices>,
    _ctx: CallContext,
    input: IdInput,
) -> Result<Option<ForumPost>, RpcError> {
    Ok(svc.forum.get_post(input.id).await?)
}

async fn get_answers(
    svc: Arc<AppServices>,
    _ctx: CallContext,
    input: PostIdInput,
) -> Result<Vec<ForumAnswer>, RpcError> {
    Ok(svc.forum.get_answers(input.post_id).await?)
}

async fn create_post(
    svc: Arc<AppServices>,
    ctx: CallContext,
    input: CreatePostInput,
) -> Result<ForumPost, RpcError> {
    let caller = ctx.require_caller()?;
    let (title, content, category, tags) = input.into_parts();
    Ok(svc
        .forum
        .create_post(caller, title, content, category, tags)
        .await?)
}

async fn create_answer(
    svc: Arc<AppServices>,
    ctx: CallContext,
    input: CreateAnswerInput,
) -> Result<ForumAnswer, RpcError> {
    let caller = ctx.require_caller()?;
    let content = input.content.trim().to_owned();
    Ok(svc.forum.create_answer(caller, input.post_id, content).await?)
}

async fn vote_answer(
    svc: Arc<AppServices>,
    ctx: CallContext,
    input: VoteAnswerInput,
) -> Result<VoteResult, RpcError> {
    let caller = ctx.require_caller()?;
    let votes = svc
        .forum
        .vote_answer(caller, input.answer_id, input.vote_type)
        .await?;
    Ok(VoteResult {
        success: true,
        votes,
    })
}

async fn mark_best_answer(
    svc: Arc<AppServices>,
    ctx: CallContext,
    input: AnswerIdInput,
) -> Result<Success, RpcError> {
    let caller = ctx.require_caller()?;
    svc.forum.mark_best_answer(caller, input.answer_id).await?;
    Ok(Success::OK)
}
