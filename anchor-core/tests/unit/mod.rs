mod digest_binding;
