mod concurrency;
mod versioning;
