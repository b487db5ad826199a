mod helpers;
mod sessions;
