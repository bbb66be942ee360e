pub mod legal;
pub mod mock;
pub mod watson;

pub use mock::{mock_result, MockNluClient};
pub use watson::WatsonNluClient;
