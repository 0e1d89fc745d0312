//! Wire schema re-exported from the shared `api` crate.

pub use api::types::{
    Comment, CommentId, Credentials, LikeResult, Message, NewPost, Post, PostId, ProfileUpdate, Registration, Upload,
    User, UserId,
};
