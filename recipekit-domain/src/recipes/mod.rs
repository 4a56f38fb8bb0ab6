use crate::error::SpecError;
use crate::recipe::Recipe;

mod icon;
mod icontools;

pub use icon::Icon;
pub use icontools::IconTools;

pub fn builtin_recipes() -> Vec<Box<dyn Recipe>> {
    vec![Box::new(Icon::new()), Box::new(IconTools::new())]
}

pub fn recipe_names() -> Vec<&'static str> {
    builtin_recipes().iter().map(|r| r.meta().name).collect()
}

pub fn lookup_recipe(name: &str) -> Result<Box<dyn Recipe>, SpecError> {
    builtin_recipes()
        .into_iter()
        .find(|r| r.meta().name == name)
        .ok_or_else(|| SpecError::UnknownRecipe {
            name: name.to_string(),
            available: recipe_names().join(", "),
        })
}
