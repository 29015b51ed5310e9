mod auth_failures;
mod full_run;
