/// A parsed `parley` subcommand, ready to run to completion.
pub trait CallableTrait {
    fn call(&self) -> Result<(), Box<dyn std::error::Error>>;
}
