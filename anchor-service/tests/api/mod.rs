mod batch_test;
mod rate_limit_test;
mod signature_methods_test;
