mod console;

pub use console::ConsoleFrontend;
