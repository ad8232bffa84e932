mod security_context;
