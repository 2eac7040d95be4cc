pub mod daily_client;
