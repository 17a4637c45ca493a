use std::collections::{BTreeSet, HashMap};

use log::warn;

use crate::error::{Error, Result};
use crate::models::{Comment, CommentPatch, CommentWithAuthor, NewComment, RecordId, UserSummary};
use crate::services::logged;
use crate::threads::CommentThread;
use crate::validation;
use crate::Marketplace;

/// Product comments and replies in `comentarios`. Reads come back with the
/// author's profile attached when it can be looked up.
pub struct CommentService<'a> {
    market: &'a Marketplace,
}

impl<'a> CommentService<'a> {
    pub(crate) fn new(market: &'a Marketplace) -> Self {
        Self { market }
    }

    /// Attach authors with a single `in` query. A failed lookup is logged and
    /// the comments are returned without authors.
    pub async fn with_authors(&self, comments: Vec<Comment>) -> Vec<CommentWithAuthor> {
        let ids: Vec<RecordId> = comments
            .iter()
            .filter_map(|comment| comment.user_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if ids.is_empty() {
            return comments.into_iter().map(CommentWithAuthor::bare).collect();
        }

        let authors: HashMap<RecordId, UserSummary> = match self.market.users().by_ids(&ids).await {
            Ok(users) => users.into_iter().map(|user| (user.id.clone(), user)).collect(),
            Err(err) => {
                warn!("comment authors unavailable: {}", err);
                return comments.into_iter().map(CommentWithAuthor::bare).collect();
            }
        };

        comments
            .into_iter()
            .map(|comment| {
                let author = comment
                    .user_id
                    .as_ref()
                    .and_then(|id| authors.get(id))
                    .cloned();
                CommentWithAuthor { comment, author }
            })
            .collect()
    }

    async fn with_author(&self, comment: Comment) -> CommentWithAuthor {
        let bare = CommentWithAuthor::bare(comment.clone());
        self.with_authors(vec![comment]).await.pop().unwrap_or(bare)
    }

    pub async fn create(&self, comment: &NewComment) -> Result<CommentWithAuthor> {
        validation::require_text("descripcion", &comment.text)?;
        validation::rating(comment.rating)?;

        let result = self
            .market
            .from(Comment::TABLE)
            .insert(comment)
            .execute_one::<Comment>()
            .await;
        let created = logged("creating comment", result)?;
        Ok(self.with_author(created).await)
    }

    /// Reply to `parent`. Replies carry the parent's rating.
    pub async fn reply(&self, parent: &Comment, user_id: &RecordId, text: &str) -> Result<CommentWithAuthor> {
        let reply = NewComment {
            product_id: parent.product_id.clone(),
            user_id: user_id.clone(),
            parent_id: Some(parent.id.clone()),
            rating: parent.rating.unwrap_or(5),
            text: text.trim().to_string(),
        };
        self.create(&reply).await
    }

    pub async fn list(&self) -> Result<Vec<CommentWithAuthor>> {
        let result = self.market.from(Comment::TABLE).select("*").execute().await;
        let comments = logged("listing comments", result)?;
        Ok(self.with_authors(comments).await)
    }

    pub async fn get(&self, id: &RecordId) -> Result<Option<CommentWithAuthor>> {
        let result = self
            .market
            .from(Comment::TABLE)
            .select("*")
            .eq("id", id)
            .maybe_single::<Comment>()
            .await;
        match logged("fetching comment", result)? {
            Some(comment) => Ok(Some(self.with_author(comment).await)),
            None => Ok(None),
        }
    }

    pub async fn for_product(&self, product_id: &RecordId) -> Result<Vec<CommentWithAuthor>> {
        let result = self
            .market
            .from(Comment::TABLE)
            .select("*")
            .eq("productoId", product_id)
            .execute()
            .await;
        let comments = logged("listing product comments", result)?;
        Ok(self.with_authors(comments).await)
    }

    /// Comments of a product assembled into reply trees, newest first
    pub async fn thread_for_product(&self, product_id: &RecordId) -> Result<CommentThread<CommentWithAuthor>> {
        let comments = self.for_product(product_id).await?;
        Ok(CommentThread::build(&comments))
    }

    /// Raw partial update
    pub async fn update(&self, id: &RecordId, patch: &CommentPatch) -> Result<Option<CommentWithAuthor>> {
        if let Some(text) = &patch.text {
            validation::require_text("descripcion", text)?;
        }
        if let Some(rating) = patch.rating {
            validation::rating(rating)?;
        }
        let result = self
            .market
            .from(Comment::TABLE)
            .update(patch)
            .eq("id", id)
            .execute_one::<Comment>()
            .await;
        match logged("updating comment", result)? {
            Some(comment) => Ok(Some(self.with_author(comment).await)),
            None => Ok(None),
        }
    }

    /// Edit text and rating. A reply keeps the rating it inherited.
    pub async fn edit(&self, comment: &Comment, text: &str, rating: Option<u8>) -> Result<CommentWithAuthor> {
        let patch = CommentPatch {
            text: Some(text.trim().to_string()),
            rating: if comment.is_reply() { None } else { rating },
        };
        self.update(&comment.id, &patch)
            .await?
            .ok_or_else(|| Error::not_found(format!("comment {}", comment.id)))
    }

    /// Delete one comment. Replies go with it when the table cascades; use
    /// `threads::descendants_of` to prune a local copy.
    pub async fn delete(&self, id: &RecordId) -> Result<()> {
        let result = self
            .market
            .from(Comment::TABLE)
            .delete()
            .eq("id", id)
            .execute()
            .await;
        logged("deleting comment", result)
    }
}
