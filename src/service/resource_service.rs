//! Resource service: validation and orchestration over a repository.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;

use crate::domain::{
    BlogPost, ContactFilter, ContactSubmission, EmailSubscriber, Record, ResourceId,
    SubscriberDraft, SubscriberFilter, SubscriberPatch,
};
use crate::error::CmsError;
use crate::persistence::Repository;

/// CRUD orchestration for one collection.
///
/// Coordinator over an injected [`Repository`]. Every mutation follows
/// the pattern: validate → stamp → store → log.
#[derive(Debug)]
pub struct ResourceService<R: Record> {
    repo: Arc<dyn Repository<R>>,
    /// Held across check-then-write sequences such as the subscriber
    /// email uniqueness check. Shared by clones.
    check_lock: Arc<Mutex<()>>,
}

impl<R: Record> Clone for ResourceService<R> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            check_lock: Arc::clone(&self.check_lock),
        }
    }
}

impl<R: Record> ResourceService<R> {
    /// Creates a service over `repo`.
    #[must_use]
    pub fn new(repo: Arc<dyn Repository<R>>) -> Self {
        Self {
            repo,
            check_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Returns every record in insertion order.
    ///
    /// # Errors
    ///
    /// Propagates repository failures.
    pub async fn list(&self) -> Result<Vec<R>, CmsError> {
        self.repo.list().await
    }

    /// Returns the records matching `keep`, order preserved.
    ///
    /// # Errors
    ///
    /// Propagates repository failures.
    pub async fn list_where<F>(&self, keep: F) -> Result<Vec<R>, CmsError>
    where
        F: Fn(&R) -> bool + Send,
    {
        let mut records = self.repo.list().await?;
        records.retain(keep);
        Ok(records)
    }

    /// Returns one record.
    ///
    /// # Errors
    ///
    /// Returns [`CmsError::NotFound`] if no record has this id.
    pub async fn get(&self, id: &ResourceId) -> Result<R, CmsError> {
        self.repo.get(id).await
    }

    /// Validates `draft`, assigns a fresh id and both timestamps, and
    /// stores the record.
    ///
    /// # Errors
    ///
    /// Returns [`CmsError::InvalidRequest`] on an invalid draft, or
    /// propagates repository failures.
    pub async fn create(&self, draft: R::Draft) -> Result<R, CmsError> {
        R::validate_draft(&draft)?;
        let record = R::from_draft(ResourceId::new(), draft, Utc::now());
        let stored = self.repo.insert(record).await?;
        tracing::info!(kind = %R::KIND, id = %stored.id(), "record created");
        Ok(stored)
    }

    /// Validates `patch` and merges it into the stored record.
    ///
    /// # Errors
    ///
    /// Returns [`CmsError::InvalidRequest`] on an invalid patch or
    /// [`CmsError::NotFound`] if no record has this id.
    pub async fn update(&self, id: &ResourceId, patch: R::Patch) -> Result<R, CmsError> {
        R::validate_patch(&patch)?;
        let updated = self.repo.update(id, patch, Utc::now()).await?;
        tracing::info!(kind = %R::KIND, %id, "record updated");
        Ok(updated)
    }

    /// Removes a record.
    ///
    /// # Errors
    ///
    /// Returns [`CmsError::NotFound`] if no record has this id.
    pub async fn delete(&self, id: &ResourceId) -> Result<R, CmsError> {
        let removed = self.repo.remove(id).await?;
        tracing::info!(kind = %R::KIND, %id, "record deleted");
        Ok(removed)
    }

    /// Inserts `records` if the collection is empty. Returns how many
    /// records were added.
    ///
    /// # Errors
    ///
    /// Propagates repository failures.
    pub async fn seed_if_empty(&self, records: Vec<R>) -> Result<usize, CmsError> {
        if !self.repo.is_empty().await? {
            return Ok(0);
        }
        let count = records.len();
        for record in records {
            self.repo.insert(record).await?;
        }
        tracing::debug!(kind = %R::KIND, count, "collection seeded");
        Ok(count)
    }
}

impl ResourceService<BlogPost> {
    /// Returns the published posts, order preserved.
    ///
    /// # Errors
    ///
    /// Propagates repository failures.
    pub async fn list_public(&self) -> Result<Vec<BlogPost>, CmsError> {
        self.list_where(|post| post.published).await
    }
}

impl ResourceService<ContactSubmission> {
    /// Returns the submissions passing `filter`.
    ///
    /// # Errors
    ///
    /// Propagates repository failures.
    pub async fn list_filtered(
        &self,
        filter: &ContactFilter,
    ) -> Result<Vec<ContactSubmission>, CmsError> {
        self.list_where(|contact| filter.matches(contact)).await
    }
}

impl ResourceService<EmailSubscriber> {
    /// Returns the subscribers passing `filter`.
    ///
    /// # Errors
    ///
    /// Propagates repository failures.
    pub async fn list_filtered(
        &self,
        filter: &SubscriberFilter,
    ) -> Result<Vec<EmailSubscriber>, CmsError> {
        self.list_where(|sub| filter.matches(sub)).await
    }

    /// Adds a subscriber unless the address is already on the list.
    ///
    /// Concurrent calls with the same address admit exactly one.
    ///
    /// # Errors
    ///
    /// Returns [`CmsError::Conflict`] for a known address, or the errors of
    /// [`ResourceService::create`].
    pub async fn subscribe(&self, draft: SubscriberDraft) -> Result<EmailSubscriber, CmsError> {
        EmailSubscriber::validate_draft(&draft)?;
        let _check = self.check_lock.lock().await;
        self.ensure_unique_email(&draft.email, None).await?;
        self.create(draft).await
    }

    /// Updates a subscriber, keeping addresses unique.
    ///
    /// # Errors
    ///
    /// Returns [`CmsError::Conflict`] if the new address belongs to another
    /// subscriber, or the errors of [`ResourceService::update`].
    pub async fn update_subscriber(
        &self,
        id: &ResourceId,
        patch: SubscriberPatch,
    ) -> Result<EmailSubscriber, CmsError> {
        let _check = self.check_lock.lock().await;
        if let Some(email) = &patch.email {
            self.ensure_unique_email(email, Some(id)).await?;
        }
        self.update(id, patch).await
    }

    /// Active subscriber addresses, one per line.
    ///
    /// # Errors
    ///
    /// Propagates repository failures.
    pub async fn export_active(&self) -> Result<String, CmsError> {
        let active = self.list_where(|sub| sub.is_active).await?;
        Ok(active
            .iter()
            .map(|sub| sub.email.as_str())
            .collect::<Vec<_>>()
            .join("\n"))
    }

    async fn ensure_unique_email(
        &self,
        email: &str,
        except: Option<&ResourceId>,
    ) -> Result<(), CmsError> {
        let taken = self
            .repo
            .list()
            .await?
            .iter()
            .any(|sub| sub.same_email(email) && Some(&sub.id) != except);
        if taken {
            return Err(CmsError::Conflict(format!(
                "{} is already subscribed",
                email.trim()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::domain::{BlogDraft, BlogPatch, ContactDraft, ContactPatch, ContactStatus, seed};
    use crate::persistence::MemoryRepository;

    fn service<R: Record>(records: Vec<R>) -> ResourceService<R> {
        ResourceService::new(Arc::new(MemoryRepository::with_records(records)))
    }

    fn blog_draft(title: &str, published: bool) -> BlogDraft {
        BlogDraft {
            title: title.to_string(),
            content: "C".to_string(),
            image_name: None,
            image_file: None,
            published,
        }
    }

    #[tokio::test]
    async fn create_assigns_unique_ids_and_equal_timestamps() {
        let blogs = service::<BlogPost>(seed::blogs());
        let mut ids = HashSet::new();
        for i in 0..20 {
            let Ok(post) = blogs.create(blog_draft(&format!("T{i}"), false)).await else {
                panic!("create failed");
            };
            assert_eq!(post.created_at, post.updated_at);
            assert!(ids.insert(post.id.clone()));
        }
        let Ok(all) = blogs.list().await else {
            panic!("list failed");
        };
        let unique: HashSet<_> = all.iter().map(|p| p.id.clone()).collect();
        assert_eq!(unique.len(), all.len());
    }

    #[tokio::test]
    async fn create_rejects_invalid_draft_without_storing() {
        let blogs = service::<BlogPost>(Vec::new());
        let result = blogs.create(blog_draft("", true)).await;
        assert!(matches!(result, Err(CmsError::InvalidRequest(_))));
        assert!(blogs.list().await.unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn update_keeps_created_at_and_advances_updated_at() {
        let blogs = service::<BlogPost>(Vec::new());
        let Ok(post) = blogs.create(blog_draft("T", false)).await else {
            panic!("create failed");
        };
        let patch = BlogPatch {
            content: Some("new body".to_string()),
            ..BlogPatch::default()
        };
        let Ok(updated) = blogs.update(&post.id, patch).await else {
            panic!("update failed");
        };
        assert_eq!(updated.created_at, post.created_at);
        assert!(updated.updated_at >= post.updated_at);
        assert_eq!(updated.content, "new body");
    }

    #[tokio::test]
    async fn public_list_is_ordered_subset() {
        let blogs = service::<BlogPost>(Vec::new());
        for (title, published) in [("a", true), ("b", false), ("c", true), ("d", false)] {
            let _ = blogs.create(blog_draft(title, published)).await;
        }
        let Ok(public) = blogs.list_public().await else {
            panic!("list_public failed");
        };
        let titles: Vec<&str> = public.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn contact_status_lifecycle() {
        let contacts = service::<ContactSubmission>(Vec::new());
        let Ok(created) = contacts
            .create(ContactDraft {
                name: "Ann".to_string(),
                email: "ann@example.com".to_string(),
                phone: None,
                subject: Some("Quote".to_string()),
                message: "Ship 3 pallets".to_string(),
            })
            .await
        else {
            panic!("create failed");
        };
        assert_eq!(created.status, ContactStatus::Pending);

        let Ok(read) = contacts
            .update(&created.id, ContactPatch::status(ContactStatus::Read))
            .await
        else {
            panic!("update failed");
        };
        assert_eq!(read.status, ContactStatus::Read);

        let pending = ContactFilter {
            status: Some(ContactStatus::Pending),
            q: None,
        };
        assert!(contacts.list_filtered(&pending).await.unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn duplicate_subscription_conflicts() {
        let subs = service::<EmailSubscriber>(seed::subscribers());
        let draft = SubscriberDraft {
            email: "JOHN.DOE@example.com".to_string(),
            first_name: None,
            last_name: None,
            is_active: true,
        };
        let result = subs.subscribe(draft).await;
        assert!(matches!(result, Err(CmsError::Conflict(_))));
        assert_eq!(subs.list().await.unwrap_or_default().len(), 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_subscriptions_admit_one() {
        let subs = Arc::new(service::<EmailSubscriber>(Vec::new()));
        let barrier = Arc::new(tokio::sync::Barrier::new(8));
        let mut handles = Vec::new();
        for i in 0..8 {
            let subs = Arc::clone(&subs);
            let barrier = Arc::clone(&barrier);
            let email = if i % 2 == 0 { "a@example.com" } else { "A@Example.com" };
            handles.push(tokio::spawn(async move {
                barrier.wait().await;
                subs.subscribe(SubscriberDraft {
                    email: email.to_string(),
                    first_name: None,
                    last_name: None,
                    is_active: true,
                })
                .await
            }));
        }

        let mut admitted = 0;
        for handle in handles {
            match handle.await {
                Ok(Ok(_)) => admitted += 1,
                Ok(Err(CmsError::Conflict(_))) => {}
                other => panic!("unexpected result: {other:?}"),
            }
        }
        assert_eq!(admitted, 1);
        assert_eq!(subs.list().await.unwrap_or_default().len(), 1);
    }

    #[tokio::test]
    async fn email_change_to_taken_address_conflicts() {
        let subs = service::<EmailSubscriber>(seed::subscribers());
        let patch = SubscriberPatch {
            email: Some("jane.smith@example.com".to_string()),
            ..SubscriberPatch::default()
        };
        let result = subs.update_subscriber(&ResourceId::from("1"), patch).await;
        assert!(matches!(result, Err(CmsError::Conflict(_))));

        let own = SubscriberPatch {
            email: Some("John.Doe@example.com".to_string()),
            ..SubscriberPatch::default()
        };
        assert!(subs.update_subscriber(&ResourceId::from("1"), own).await.is_ok());
    }

    #[tokio::test]
    async fn export_lists_active_addresses() {
        let subs = service::<EmailSubscriber>(seed::subscribers());
        let Ok(export) = subs.export_active().await else {
            panic!("export failed");
        };
        assert_eq!(export, "john.doe@example.com\njane.smith@example.com");
    }

    #[tokio::test]
    async fn seed_only_fills_empty_collections() {
        let blogs = service::<BlogPost>(Vec::new());
        assert_eq!(blogs.seed_if_empty(seed::blogs()).await.unwrap_or_default(), 2);
        assert_eq!(blogs.seed_if_empty(seed::blogs()).await.unwrap_or_default(), 0);
    }

    #[tokio::test]
    async fn delete_unknown_id_is_not_found() {
        let blogs = service::<BlogPost>(seed::blogs());
        let result = blogs.delete(&ResourceId::from("404")).await;
        assert!(matches!(result, Err(CmsError::NotFound { .. })));
        assert_eq!(blogs.list().await.unwrap_or_default().len(), 2);
    }
}
