use std::cell::Cell as Counter;

use bothunt_core::{AccountId, AccountSnapshot, FetchError, TweetRecord};
use chrono::{Duration, Utc};

use super::*;
use crate::model::TrainOptions;
use crate::test_support::labelled_dataset;
use crate::training::TrainingSet;

fn trained_model() -> BotModel {
    let set = TrainingSet::from_dataset(&labelled_dataset(45));
    let options = TrainOptions {
        n_trees: 10,
        ..TrainOptions::default()
    };
    BotModel::train(&set, &options)
        .expect("training should succeed")
        .0
}

fn snapshot(id: AccountId, screen_name: &str) -> AccountSnapshot {
    AccountSnapshot {
        id,
        screen_name: screen_name.to_owned(),
        protected: false,
        verified: false,
        geo_enabled: false,
        created_at: Utc::now() - Duration::days(100),
        followers_count: 10,
        friends_count: 200,
        profile_image_url: String::new(),
        description: String::new(),
    }
}

struct FakeProvider {
    accounts: Vec<AccountSnapshot>,
    lookups: Counter<u32>,
    pages: Counter<u32>,
}

impl FakeProvider {
    fn new(accounts: Vec<AccountSnapshot>) -> Self {
        Self {
            accounts,
            lookups: Counter::new(0),
            pages: Counter::new(0),
        }
    }
}

impl AccountProvider for FakeProvider {
    async fn get_account(&self, id: AccountId) -> Result<AccountSnapshot, FetchError> {
        self.lookups.set(self.lookups.get() + 1);
        self.accounts
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or(FetchError::NotFound)
    }

    async fn get_account_by_screen_name(
        &self,
        screen_name: &str,
    ) -> Result<AccountSnapshot, FetchError> {
        self.lookups.set(self.lookups.get() + 1);
        self.accounts
            .iter()
            .find(|a| a.screen_name == screen_name)
            .cloned()
            .ok_or(FetchError::NotFound)
    }

    async fn get_timeline_page(
        &self,
        _id: AccountId,
        _page_size: u32,
        max_id: Option<u64>,
    ) -> Result<Vec<TweetRecord>, FetchError> {
        self.pages.set(self.pages.get() + 1);
        if max_id.is_some() {
            return Ok(Vec::new());
        }
        Ok((1..=50)
            .rev()
            .map(|i| TweetRecord {
                id: i,
                created_at: Utc::now() - Duration::days(i64::try_from(i).unwrap_or(0)),
                text: String::new(),
            })
            .collect())
    }
}

#[test]
fn cache_path_strips_at_sign() {
    assert_eq!(
        cache_path(Path::new("/tmp/f"), "@someone"),
        PathBuf::from("/tmp/f/someone_account_features.csv")
    );
}

#[tokio::test]
async fn fresh_account_is_classified_and_cached() {
    let dir = tempfile::tempdir().unwrap();
    let provider = FakeProvider::new(vec![snapshot(1, "spammy")]);
    let model = trained_model();
    let classifier = AccountClassifier::new(&provider, &model, dir.path(), 200);

    let class = classifier.classify("@spammy").await.unwrap();

    let cached = CsvStore::new(cache_path(dir.path(), "spammy")).load().unwrap();
    let row = cached.row(1).expect("cache holds the account row");
    assert_eq!(row.extra, vec!["spammy".to_owned()]);
    assert!(row.features.is_fully_populated());
    let vector = FeatureVector::try_from(&row.features).unwrap();
    assert_eq!(model.predict(&vector).unwrap(), class);

    let lookups = provider.lookups.get();
    let again = classifier.classify("spammy").await.unwrap();
    assert_eq!(again, class);
    assert_eq!(provider.lookups.get(), lookups, "second call served from cache");
}

#[tokio::test]
async fn protected_and_verified_accounts_are_human() {
    let dir = tempfile::tempdir().unwrap();
    let mut locked = snapshot(2, "locked");
    locked.protected = true;
    let mut blue = snapshot(3, "blue");
    blue.verified = true;
    let provider = FakeProvider::new(vec![locked, blue]);
    let model = trained_model();
    let classifier = AccountClassifier::new(&provider, &model, dir.path(), 200);

    assert_eq!(classifier.classify("locked").await.unwrap(), BotClass::Human);
    // protected timelines are never requested
    assert_eq!(provider.pages.get(), 0);
    assert_eq!(classifier.classify("blue").await.unwrap(), BotClass::Human);
}

#[tokio::test]
async fn unknown_account_is_a_fetch_error() {
    let dir = tempfile::tempdir().unwrap();
    let provider = FakeProvider::new(vec![]);
    let model = trained_model();
    let classifier = AccountClassifier::new(&provider, &model, dir.path(), 200);

    let err = classifier.classify("ghost").await.unwrap_err();
    assert!(
        matches!(err, ClassifyError::Fetch { source: FetchError::NotFound, .. }),
        "{err:?}"
    );
    assert!(!cache_path(dir.path(), "ghost").exists());
}

#[tokio::test]
async fn undefined_ratio_is_reported_as_incomplete() {
    let dir = tempfile::tempdir().unwrap();
    let mut lonely = snapshot(4, "lonely");
    lonely.followers_count = 0;
    let provider = FakeProvider::new(vec![lonely]);
    let model = trained_model();
    let classifier = AccountClassifier::new(&provider, &model, dir.path(), 200);

    match classifier.classify("lonely").await {
        Err(ClassifyError::IncompleteFeatures { screen_name, missing }) => {
            assert_eq!(screen_name, "lonely");
            assert_eq!(missing, vec![Feature::FriendsFollowersRatio]);
        }
        other => panic!("expected IncompleteFeatures, got {other:?}"),
    }
}

#[tokio::test]
async fn existing_cache_file_is_used_without_lookups() {
    let dir = tempfile::tempdir().unwrap();
    let labelled = labelled_dataset(3);
    // the cache never stores a label column
    let mut plain = Dataset::new();
    plain.register(2);
    plain.row_mut(2).unwrap().features = labelled.row(2).unwrap().features;
    CsvStore::new(cache_path(dir.path(), "known")).save(&plain).unwrap();

    let provider = FakeProvider::new(vec![]);
    let model = trained_model();
    let classifier = AccountClassifier::new(&provider, &model, dir.path(), 200);

    assert_eq!(
        classifier.classify("known").await.unwrap(),
        BotClass::SocialBot
    );
    assert_eq!(provider.lookups.get(), 0);
}
