mod helpers;
mod identity;
mod requests;
