mod async_await;
mod resolve;
mod variables;
