pub mod discord;
pub mod dispatcher;
pub mod format;
pub mod telegram;

pub use discord::DiscordChannel;
pub use dispatcher::{Delivery, Dispatcher};
pub use telegram::TelegramChannel;
