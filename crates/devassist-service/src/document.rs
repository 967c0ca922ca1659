//! Knowledge-base articles and playbooks: plain CRUD over tagged
//! documents. Role gating for writes happens at the route layer.

use devassist_core::error::DevAssistResult;
use devassist_core::models::kb_article::{
    CreateKbArticle, KbArticle, KbArticleFilter, UpdateKbArticle,
};
use devassist_core::models::playbook::{CreatePlaybook, Playbook, PlaybookFilter, UpdatePlaybook};
use devassist_core::repository::{KbArticleRepository, PlaybookRepository};
use tracing::info;
use uuid::Uuid;

pub struct KbService<K: KbArticleRepository> {
    articles: K,
}

impl<K: KbArticleRepository> KbService<K> {
    pub fn new(articles: K) -> Self {
        Self { articles }
    }

    pub async fn list(&self, filter: KbArticleFilter) -> DevAssistResult<Vec<KbArticle>> {
        self.articles.list(filter).await
    }

    pub async fn get(&self, id: Uuid) -> DevAssistResult<KbArticle> {
        self.articles.get_by_id(id).await
    }

    pub async fn create(&self, input: CreateKbArticle) -> DevAssistResult<KbArticle> {
        let article = self.articles.create(input).await?;
        info!(article_id = %article.id, "KB article created");
        Ok(article)
    }

    pub async fn update(&self, id: Uuid, patch: UpdateKbArticle) -> DevAssistResult<KbArticle> {
        self.articles.update(id, patch).await
    }

    /// Hard delete; returns the deleted id.
    pub async fn delete(&self, id: Uuid) -> DevAssistResult<Uuid> {
        self.articles.delete(id).await?;
        info!(article_id = %id, "KB article deleted");
        Ok(id)
    }
}

pub struct PlaybookService<P: PlaybookRepository> {
    playbooks: P,
}

impl<P: PlaybookRepository> PlaybookService<P> {
    pub fn new(playbooks: P) -> Self {
        Self { playbooks }
    }

    pub async fn list(&self, filter: PlaybookFilter) -> DevAssistResult<Vec<Playbook>> {
        self.playbooks.list(filter).await
    }

    pub async fn get(&self, id: Uuid) -> DevAssistResult<Playbook> {
        self.playbooks.get_by_id(id).await
    }

    pub async fn create(&self, input: CreatePlaybook) -> DevAssistResult<Playbook> {
        let playbook = self.playbooks.create(input).await?;
        info!(playbook_id = %playbook.id, "Playbook created");
        Ok(playbook)
    }

    pub async fn update(&self, id: Uuid, patch: UpdatePlaybook) -> DevAssistResult<Playbook> {
        self.playbooks.update(id, patch).await
    }

    /// Hard delete; returns the deleted id.
    pub async fn delete(&self, id: Uuid) -> DevAssistResult<Uuid> {
        self.playbooks.delete(id).await?;
        info!(playbook_id = %id, "Playbook deleted");
        Ok(id)
    }
}
