mod auth_handlers_test;
