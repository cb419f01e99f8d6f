//! Route path constants.

// Accounts
pub const POST_USERS_REGISTER: &str = "/api/users/register";
pub const POST_USERS_LOGIN: &str = "/api/users/login";
pub const GET_USERS_VALIDATE: &str = "/api/users/validate";
pub const GET_USERS: &str = "/api/users";
pub const GET_USERS_ME: &str = "/api/users/me";
pub const GET_USERS_FAVOURITES: &str = "/api/users/favourites";
pub const PUT_USERS_PROFILE: &str = "/api/users/profile";
pub const GET_USERS_ID: &str = "/api/users/{id}";

// Recipes
pub const RECIPES: &str = "/api/recipes";
pub const GET_RECIPES_USER: &str = "/api/recipes/user";
pub const GET_RECIPES_USER_ID: &str = "/api/recipes/user/{id}";
pub const GET_RECIPES_SEARCH: &str = "/api/recipes/search";
pub const RECIPES_RECIPE_ID: &str = "/api/recipes/recipe/{id}";
pub const RECIPES_ID_FAVOURITE: &str = "/api/recipes/{id}/favourite";

// Tags
pub const GET_TAGS: &str = "/api/tags";

// Cookbooks
pub const COOKBOOKS: &str = "/api/cookbooks";
pub const GET_COOKBOOKS_SEARCH: &str = "/api/cookbooks/search";
pub const GET_COOKBOOKS_USER: &str = "/api/cookbooks/user";
pub const GET_COOKBOOKS_USER_ID: &str = "/api/cookbooks/user/{id}";
pub const COOKBOOKS_ID: &str = "/api/cookbooks/{id}";
pub const COOKBOOKS_ID_RECIPES_ID: &str = "/api/cookbooks/{id}/recipes/{recipe_id}";
pub const COOKBOOKS_ID_COLLABORATORS: &str = "/api/cookbooks/{id}/collaborators";

// Administration
pub const POST_ADMIN_LOGIN: &str = "/api/admin/login";
pub const GET_ADMIN_VALIDATE: &str = "/api/admin/validate";
pub const GET_ADMIN_USERS: &str = "/api/admin/users";
pub const DELETE_ADMIN_USERS_ID: &str = "/api/admin/users/{id}";
pub const GET_ADMIN_RECIPES: &str = "/api/admin/recipes";
pub const DELETE_ADMIN_RECIPES_ID: &str = "/api/admin/recipes/{id}";
