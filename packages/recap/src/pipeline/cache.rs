//! Cache lookup over persisted artifacts.
//!
//! Lookup is a linear scan: every stored source URL is re-normalized with the
//! kind it was stored under and compared with the needle. Duplicates resolve
//! to the most recently created artifact. A bundle whose summary is missing
//! (interrupted persist) is not a hit.

use tracing::debug;

use crate::error::PersistenceResult;
use crate::identity::{canonical_key, normalize};
use crate::traits::store::ArtifactStore;
use crate::types::artifact::{ArtifactMeta, CachedArtifact};
use crate::types::content::ContentKind;

/// Stored artifacts whose source normalizes to `key`, newest first.
async fn matching<S: ArtifactStore + ?Sized>(
    store: &S,
    key: &str,
    kind: Option<ContentKind>,
) -> PersistenceResult<Vec<ArtifactMeta>> {
    let mut found: Vec<ArtifactMeta> = store
        .list()
        .await?
        .into_iter()
        .filter(|meta| kind.map_or(true, |k| meta.kind == k))
        .filter(|meta| {
            canonical_key(&meta.source_url, meta.kind)
                .map(|stored| stored == key)
                .unwrap_or(false)
        })
        .collect();
    found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(found)
}

/// Most recent complete artifact for a canonical key.
pub async fn find_cached<S: ArtifactStore + ?Sized>(
    store: &S,
    key: &str,
    kind: Option<ContentKind>,
) -> PersistenceResult<Option<CachedArtifact>> {
    for meta in matching(store, key, kind).await? {
        match store.get_summary(&meta.slug).await? {
            Some(summary) => return Ok(Some(CachedArtifact::from_meta(meta, summary))),
            None => debug!(slug = %meta.slug, "Skipping artifact without a summary"),
        }
    }
    Ok(None)
}

/// Most recent artifact made from `url`, as a page or video, else as a site.
pub async fn find_by_url<S: ArtifactStore + ?Sized>(
    store: &S,
    url: &str,
) -> PersistenceResult<Option<ArtifactMeta>> {
    if let Ok((kind, key)) = normalize(url, false) {
        if let Some(meta) = matching(store, &key, Some(kind)).await?.into_iter().next() {
            return Ok(Some(meta));
        }
    }
    match canonical_key(url, ContentKind::Site) {
        Ok(key) => Ok(matching(store, &key, Some(ContentKind::Site))
            .await?
            .into_iter()
            .next()),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::MemoryStore;
    use crate::types::artifact::ArtifactBundle;
    use crate::types::content::ContentItem;
    use chrono::{TimeZone, Utc};

    fn bundle(slug: &str, url: &str, day: u32, summary: &str) -> ArtifactBundle {
        let key = canonical_key(url, ContentKind::Web).unwrap();
        let item = ContentItem::web(url, key, "T", "text");
        ArtifactBundle {
            meta: ArtifactMeta::for_item(slug, &item)
                .with_created_at(Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()),
            content: "text".into(),
            summary: summary.into(),
        }
    }

    #[tokio::test]
    async fn test_miss_is_none() {
        let store = MemoryStore::new();
        assert!(find_cached(&store, "https://a.com/x", None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_hit_normalizes_stored_url() {
        let store = MemoryStore::new();
        store.save(&bundle("s1", "https://a.com/x/#frag", 1, "stored")).await.unwrap();

        let hit = find_cached(&store, "https://a.com/x", Some(ContentKind::Web))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(hit.slug, "s1");
        assert_eq!(hit.summary_text, "stored");

        assert!(find_cached(&store, "https://a.com/x", Some(ContentKind::Site))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_duplicates_prefer_newest() {
        let store = MemoryStore::new();
        store.save(&bundle("old", "https://a.com/x", 1, "old")).await.unwrap();
        store.save(&bundle("new", "https://a.com/x", 5, "new")).await.unwrap();
        store.save(&bundle("mid", "https://a.com/x", 3, "mid")).await.unwrap();

        let hit = find_cached(&store, "https://a.com/x", None).await.unwrap().unwrap();
        assert_eq!(hit.slug, "new");
    }

    #[tokio::test]
    async fn test_missing_summary_is_not_a_hit() {
        let store = MemoryStore::new();
        store.save(&bundle("done", "https://a.com/x", 1, "complete")).await.unwrap();
        store.save(&bundle("partial", "https://a.com/x", 2, "lost")).await.unwrap();
        store.remove_summary("partial");

        let hit = find_cached(&store, "https://a.com/x", None).await.unwrap().unwrap();
        assert_eq!(hit.slug, "done");
    }

    #[tokio::test]
    async fn test_find_by_url_falls_back_to_site() {
        let store = MemoryStore::new();
        let site = crate::types::site::SiteContent::new("https://a.com", "A", vec![]);
        let item = ContentItem::site("https://a.com/docs", "https://a.com", site);
        store
            .save(&ArtifactBundle {
                meta: ArtifactMeta::for_item("site", &item),
                content: String::new(),
                summary: "s".into(),
            })
            .await
            .unwrap();

        let meta = find_by_url(&store, "https://a.com/anything").await.unwrap().unwrap();
        assert_eq!(meta.slug, "site");
        assert!(find_by_url(&store, "https://b.com").await.unwrap().is_none());
    }
}
