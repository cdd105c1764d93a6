pub mod block;

pub use block::TwitterFeedBlock;
