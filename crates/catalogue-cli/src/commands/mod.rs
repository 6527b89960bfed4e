pub mod build;
pub mod list;
pub mod show;
pub mod swagger;

pub use build::BuildCommand;
pub use list::ListCommand;
pub use show::ShowCommand;
pub use swagger::SwaggerCommand;
