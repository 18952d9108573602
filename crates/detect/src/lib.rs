mod classify;
mod fetch;
mod insights;
mod normalize;

pub use classify::{Classifier, ClassifyError, RemoteClassifier};
pub use fetch::{FetchError, FetchedImage, HttpImageFetcher, ImageFetcher};
pub use insights::{InsightError, InsightGenerator, RemoteInsightGenerator};
pub use normalize::{
    ALLOWED_IMAGE_TYPES, FileInput, MAX_IMAGE_BYTES, NormalizeError, NormalizedImage, data_uri,
    normalize_file, normalize_url,
};
