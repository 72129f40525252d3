use bothunt_core::{AccountId, BotClass, Cell, Feature, FeatureRow, FeatureValue};
use bothunt_dataset::Dataset;

/// A fully valued row whose values sit in a range typical for `class`,
/// nudged by `jitter` so rows are not identical.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_wrap)]
pub(crate) fn valued_row(class: BotClass, jitter: u64) -> FeatureRow {
    let j = jitter as f64;
    let (age, avg, inactive, default_image, bio_empty, ratio) = match class {
        BotClass::Human => (2000 + jitter as i64, 1.0 + j * 0.01, 800, false, false, 0.9),
        BotClass::TraditionalBot => (90 + jitter as i64, 80.0 + j, 0, true, true, 25.0),
        BotClass::SocialBot => (600 + jitter as i64, 15.0 + j * 0.1, 40, false, true, 4.0),
    };
    let mut row = FeatureRow::empty();
    row.set(Feature::IsProtected, Cell::Value(FeatureValue::Bool(false)));
    row.set(Feature::TimeOfExistence, Cell::Value(FeatureValue::Int(age)));
    row.set(Feature::AverageDailyTweets, Cell::Value(FeatureValue::Float(avg)));
    row.set(Feature::InactiveDays, Cell::Value(FeatureValue::Int(inactive)));
    row.set(Feature::HasDefaultImage, Cell::Value(FeatureValue::Bool(default_image)));
    row.set(Feature::BioIsEmpty, Cell::Value(FeatureValue::Bool(bio_empty)));
    row.set(Feature::FriendsFollowersRatio, Cell::Value(FeatureValue::Float(ratio)));
    row.set(Feature::IsVerified, Cell::Value(FeatureValue::Bool(false)));
    row
}

/// `n` labelled rows with ids `0..n`, cycling through the three classes.
pub(crate) fn labelled_dataset(n: u64) -> Dataset {
    let mut ds = Dataset::new();
    for id in 0..n {
        let class = BotClass::ALL[usize::try_from(id % 3).unwrap_or_default()];
        add_row(&mut ds, id, class, id / 3);
    }
    ds
}

fn add_row(ds: &mut Dataset, id: AccountId, class: BotClass, jitter: u64) {
    ds.register(id);
    if let Some(row) = ds.row_mut(id) {
        row.features = valued_row(class, jitter);
    }
    ds.set_label(id, class);
}
